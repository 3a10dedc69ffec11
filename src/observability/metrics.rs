use prometheus::{
    Encoder, Gauge, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub position_samples_total: IntCounterVec,
    pub trips_completed_total: IntCounter,
    pub stop_charges_total: IntCounterVec,
    pub current_fare: Gauge,
    pub command_latency_seconds: HistogramVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let position_samples_total = IntCounterVec::new(
            Opts::new("position_samples_total", "Position samples by outcome"),
            &["outcome"],
        )
        .expect("valid position_samples_total metric");

        let trips_completed_total =
            IntCounter::new("trips_completed_total", "Trips stopped this session")
                .expect("valid trips_completed_total metric");

        let stop_charges_total = IntCounterVec::new(
            Opts::new("stop_charges_total", "Waypoint charges by kind"),
            &["kind"],
        )
        .expect("valid stop_charges_total metric");

        let current_fare = Gauge::new("current_fare", "Fare currently shown by the meter")
            .expect("valid current_fare metric");

        let command_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "command_latency_seconds",
                "Time spent applying a meter command in seconds",
            ),
            &["command"],
        )
        .expect("valid command_latency_seconds metric");

        registry
            .register(Box::new(position_samples_total.clone()))
            .expect("register position_samples_total");
        registry
            .register(Box::new(trips_completed_total.clone()))
            .expect("register trips_completed_total");
        registry
            .register(Box::new(stop_charges_total.clone()))
            .expect("register stop_charges_total");
        registry
            .register(Box::new(current_fare.clone()))
            .expect("register current_fare");
        registry
            .register(Box::new(command_latency_seconds.clone()))
            .expect("register command_latency_seconds");

        Self {
            registry,
            position_samples_total,
            trips_completed_total,
            stop_charges_total,
            current_fare,
            command_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
