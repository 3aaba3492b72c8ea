use app::{InjectedTo, Reduced};
use sources_common::MarketSnapshot;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Dashboard {
    latest: Option<MarketSnapshot>,
}

impl InjectedTo<Dashboard> for MarketSnapshot {
    fn inject_to(self, mut state: Dashboard) -> Dashboard {
        state.latest = Some(self);
        state
    }
}

impl Reduced<MarketSnapshot> for Dashboard {
    fn reduce(&self) -> Option<MarketSnapshot> {
        self.latest.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use sources_common::RateContext;

    use super::*;

    fn snapshot(rate: f64) -> MarketSnapshot {
        MarketSnapshot {
            updated_at: Local::now(),
            forex: vec![],
            equities: vec![],
            rate: Some(RateContext {
                symbol: "ARS=X".into(),
                name: "Dólar Oficial".into(),
                rate,
            }),
        }
    }

    #[test]
    fn latest_snapshot_wins() {
        let dashboard = Dashboard::default();
        assert_eq!(dashboard.reduce(), None);

        let first = snapshot(990.0);
        let second = snapshot(1000.0);
        let dashboard = second.clone().inject_to(first.inject_to(dashboard));

        assert_eq!(dashboard.reduce(), Some(second));
    }
}
