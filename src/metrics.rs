use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

static METRICS: OnceCell<Metrics> = OnceCell::new();

impl Metrics {
    /// Install the Prometheus recorder once per process and return it.
    /// When another recorder already owns the global slot, the handle still
    /// renders (empty) output.
    pub fn global() -> &'static Metrics {
        METRICS.get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "prometheus recorder not installed");
            }
            Metrics { handle }
        })
    }

    /// Prometheus exposition text.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
