use lazy_static::lazy_static;
use prometheus::{
    HistogramVec, IntCounterVec, IntGaugeVec, register_histogram_vec, register_int_counter_vec,
    register_int_gauge_vec,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "city_dashboard_requests_total",
        "Total number of city data requests",
        &["domain"]
    )
    .expect("register requests_total");
    pub static ref CACHE_HITS: IntCounterVec = register_int_counter_vec!(
        "city_dashboard_cache_hits_total",
        "Total cache hits",
        &["domain"]
    )
    .expect("register cache_hits_total");
    pub static ref CACHE_MISSES: IntCounterVec = register_int_counter_vec!(
        "city_dashboard_cache_misses_total",
        "Total cache misses",
        &["domain"]
    )
    .expect("register cache_misses_total");
    pub static ref PROVIDER_FAILURES: IntCounterVec = register_int_counter_vec!(
        "city_dashboard_provider_failures_total",
        "Live provider calls that failed or timed out",
        &["domain"]
    )
    .expect("register provider_failures_total");
    pub static ref RESPONSES_BY_SOURCE: IntCounterVec = register_int_counter_vec!(
        "city_dashboard_responses_total",
        "Responses served, by data source",
        &["domain", "source"]
    )
    .expect("register responses_total");
    pub static ref REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        "city_dashboard_request_latency_seconds",
        "Request latency in seconds",
        &["domain"]
    )
    .expect("register request_latency_seconds");
    pub static ref CACHE_SIZE: IntGaugeVec = register_int_gauge_vec!(
        "city_dashboard_cache_size",
        "Current number of items in each cache",
        &["domain"]
    )
    .expect("register cache_size");
}
