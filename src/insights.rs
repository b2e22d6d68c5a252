use chrono::{DateTime, FixedOffset};

use crate::models::{
    AirQualityMetrics, Insight, InsightKind, Severity, TrafficLevel, TransportMetrics, WeatherMetrics,
};
use crate::synth::time::DayPeriod;

const HOT_TEMP_C: i32 = 30;
const COOL_TEMP_C: i32 = 15;
const MUGGY_HUMIDITY: u8 = 80;
const POOR_AQI: u32 = 150;
const MODERATE_AQI: u32 = 100;
const CLEAN_AQI: u32 = 50;
const SHORT_WAIT_MIN: u32 = 5;
const LONG_WAIT_MIN: u32 = 10;

/// Fresh readings for one city, whichever domains are currently cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct Snapshot<'a> {
    pub weather: Option<&'a WeatherMetrics>,
    pub air_quality: Option<&'a AirQualityMetrics>,
    pub transport: Option<&'a TransportMetrics>,
}

impl Snapshot<'_> {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.air_quality.is_none() && self.transport.is_none()
    }
}

fn insight(kind: InsightKind, icon: &str, message: String, severity: Severity) -> Insight {
    Insight { kind, icon: icon.to_string(), message, severity }
}

fn weather_insights(weather: &WeatherMetrics, out: &mut Vec<Insight>) {
    let temp = weather.temp;
    if temp > HOT_TEMP_C {
        out.push(insight(
            InsightKind::Weather,
            "🌡️",
            format!("High temperature of {temp}°C. Stay hydrated and avoid outdoor activities during peak hours."),
            Severity::Warning,
        ));
    } else if temp < COOL_TEMP_C {
        out.push(insight(
            InsightKind::Weather,
            "🧥",
            format!("Cool temperature of {temp}°C. Consider wearing warm clothing."),
            Severity::Info,
        ));
    }

    if weather.humidity > MUGGY_HUMIDITY {
        out.push(insight(
            InsightKind::Weather,
            "💧",
            format!("High humidity at {}%. Expect muggy conditions.", weather.humidity),
            Severity::Info,
        ));
    }
}

fn air_quality_insights(air: &AirQualityMetrics, out: &mut Vec<Insight>) {
    let aqi = air.aqi;
    if aqi > POOR_AQI {
        out.push(insight(
            InsightKind::AirQuality,
            "😷",
            format!("Poor air quality (AQI: {aqi}). Limit outdoor activities and consider wearing a mask."),
            Severity::Danger,
        ));
    } else if aqi > MODERATE_AQI {
        out.push(insight(
            InsightKind::AirQuality,
            "⚠️",
            format!(
                "Moderate air quality (AQI: {aqi}). Sensitive individuals should limit prolonged outdoor exertion."
            ),
            Severity::Warning,
        ));
    } else if aqi <= CLEAN_AQI {
        out.push(insight(
            InsightKind::AirQuality,
            "🌱",
            format!("Excellent air quality (AQI: {aqi}). Perfect conditions for outdoor activities!"),
            Severity::Success,
        ));
    }
}

fn transport_insights(transport: &TransportMetrics, out: &mut Vec<Insight>) {
    match transport.traffic {
        TrafficLevel::High | TrafficLevel::VeryHigh => out.push(insight(
            InsightKind::Transport,
            "🚦",
            "Heavy traffic conditions. Consider using public transport or alternative routes.".to_string(),
            Severity::Warning,
        )),
        TrafficLevel::Low | TrafficLevel::VeryLow => out.push(insight(
            InsightKind::Transport,
            "🛣️",
            "Light traffic conditions. Great time for travel!".to_string(),
            Severity::Success,
        )),
        TrafficLevel::Moderate => {}
    }

    let wait = transport.avg_wait_time;
    if wait <= SHORT_WAIT_MIN {
        out.push(insight(
            InsightKind::Transport,
            "🚌",
            format!("Excellent public transport service with average wait time of {wait} minutes."),
            Severity::Success,
        ));
    } else if wait > LONG_WAIT_MIN {
        out.push(insight(
            InsightKind::Transport,
            "⏰",
            format!("Longer wait times for public transport ({wait} minutes). Plan accordingly."),
            Severity::Warning,
        ));
    }
}

fn time_insight(now: DateTime<FixedOffset>) -> Option<Insight> {
    let (icon, message) = match DayPeriod::at(now) {
        DayPeriod::MorningRush => ("🌅", "Morning rush hour. Public transport frequency is increased."),
        DayPeriod::EveningRush => ("🌆", "Evening rush hour. Expect higher traffic and crowded public transport."),
        DayPeriod::Night => ("🌙", "Late night hours. Limited public transport services available."),
        DayPeriod::OffPeak => return None,
    };
    Some(insight(InsightKind::General, icon, message.to_string(), Severity::Info))
}

fn default_insights() -> Vec<Insight> {
    vec![
        insight(
            InsightKind::General,
            "📊",
            "Gathering city data to provide personalized insights.".to_string(),
            Severity::Info,
        ),
        insight(
            InsightKind::General,
            "🏙️",
            "Welcome to the Smart City Dashboard! Real-time data will be available shortly.".to_string(),
            Severity::Info,
        ),
    ]
}

/// Advice for a city from whatever readings are fresh. Time-of-day advice
/// only accompanies actual readings; with nothing to say the two welcome
/// messages are returned.
pub fn derive(snapshot: &Snapshot<'_>, now: DateTime<FixedOffset>) -> Vec<Insight> {
    if snapshot.is_empty() {
        return default_insights();
    }

    let mut insights = Vec::new();
    if let Some(weather) = snapshot.weather {
        weather_insights(weather, &mut insights);
    }
    if let Some(air) = snapshot.air_quality {
        air_quality_insights(air, &mut insights);
    }
    if let Some(transport) = snapshot.transport {
        transport_insights(transport, &mut insights);
    }
    insights.extend(time_insight(now));

    if insights.is_empty() {
        return default_insights();
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn weather(temp: i32, humidity: u8) -> WeatherMetrics {
        WeatherMetrics {
            temp,
            humidity,
            desc: "Clear sky".into(),
            icon: "01d".into(),
            wind_speed: 10,
            pressure: 1012,
        }
    }

    fn air(aqi: u32) -> AirQualityMetrics {
        AirQualityMetrics {
            aqi,
            pm25: 20,
            pm10: 25,
            status: String::new(),
            no2: 10,
            so2: 2,
            co: 300,
            o3: 40,
        }
    }

    fn transport(traffic: TrafficLevel, avg_wait_time: u32) -> TransportMetrics {
        TransportMetrics {
            buses: 30,
            metro: 5,
            traffic,
            congestion_index: 50,
            avg_wait_time,
            active_routes: 25,
            speed_kmh: 40,
        }
    }

    fn kinds(insights: &[Insight]) -> Vec<(InsightKind, Severity)> {
        insights.iter().map(|i| (i.kind, i.severity)).collect()
    }

    const NOON: &str = "2024-03-04T12:00:00+05:30";

    #[test]
    fn nothing_cached_gives_welcome_messages() {
        let insights = derive(&Snapshot::default(), at("2024-03-04T08:00:00+05:30"));
        assert_eq!(insights.len(), 2);
        assert!(insights.iter().all(|i| i.kind == InsightKind::General));
        assert!(insights[0].message.starts_with("Gathering city data"));
    }

    #[test]
    fn hot_humid_polluted_congested() {
        let (w, a, t) = (weather(34, 85), air(180), transport(TrafficLevel::VeryHigh, 14));
        let snapshot = Snapshot { weather: Some(&w), air_quality: Some(&a), transport: Some(&t) };

        let insights = derive(&snapshot, at(NOON));
        assert_eq!(
            kinds(&insights),
            vec![
                (InsightKind::Weather, Severity::Warning),
                (InsightKind::Weather, Severity::Info),
                (InsightKind::AirQuality, Severity::Danger),
                (InsightKind::Transport, Severity::Warning),
                (InsightKind::Transport, Severity::Warning),
            ]
        );
        assert!(insights[0].message.contains("34°C"));
        assert!(insights[2].message.contains("AQI: 180"));
        assert!(insights[4].message.contains("14 minutes"));
    }

    #[test]
    fn pleasant_readings_are_good_news() {
        let (a, t) = (air(40), transport(TrafficLevel::Low, 4));
        let snapshot = Snapshot { weather: None, air_quality: Some(&a), transport: Some(&t) };

        let insights = derive(&snapshot, at(NOON));
        assert!(insights.iter().all(|i| i.severity == Severity::Success));
        assert_eq!(insights.len(), 3);
    }

    #[test]
    fn time_of_day_joins_real_readings() {
        let w = weather(12, 50);
        let snapshot = Snapshot { weather: Some(&w), ..Snapshot::default() };

        let insights = derive(&snapshot, at("2024-03-04T23:00:00+05:30"));
        assert_eq!(insights.len(), 2);
        assert!(insights[1].message.starts_with("Late night hours"));

        let insights = derive(&snapshot, at("2024-03-04T18:00:00+05:30"));
        assert!(insights[1].message.starts_with("Evening rush hour"));
    }

    #[test]
    fn unremarkable_readings_fall_back_to_defaults() {
        let (w, a, t) = (weather(22, 50), air(75), transport(TrafficLevel::Moderate, 8));
        let snapshot = Snapshot { weather: Some(&w), air_quality: Some(&a), transport: Some(&t) };

        let insights = derive(&snapshot, at(NOON));
        assert_eq!(insights.len(), 2);
        assert!(insights.iter().all(|i| i.kind == InsightKind::General));
    }
}
