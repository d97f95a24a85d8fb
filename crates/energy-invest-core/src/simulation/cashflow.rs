use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::AppraisalError;
use crate::project::ProjectConfiguration;
use crate::simulation::production::ProductionProfile;
use crate::types::{CashFlowRow, MegawattHours, Money};
use crate::AppraisalResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Year-by-year projection. Every vector is indexed by project year and has
/// `lifetime + 1` entries; year 0 holds only the capital outlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTimeline {
    pub commissioning_year: u32,
    pub total_capex: Money,
    pub generation_mwh: Vec<MegawattHours>,
    pub storage_discharge_mwh: Vec<MegawattHours>,
    pub revenue: Vec<Money>,
    pub operating_cost: Vec<Money>,
    pub ebitda: Vec<Money>,
    pub tax: Vec<Money>,
    pub net_cash_flow: Vec<Money>,
}

/// One year of the timeline, all columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineYear {
    pub year: u32,
    pub generation_mwh: MegawattHours,
    pub storage_discharge_mwh: MegawattHours,
    pub revenue: Money,
    pub operating_cost: Money,
    pub ebitda: Money,
    pub tax: Money,
    pub net_cash_flow: Money,
    pub cumulative_cash_flow: Money,
}

impl YearlyTimeline {
    pub fn len(&self) -> usize {
        self.net_cash_flow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.net_cash_flow.is_empty()
    }

    /// Running sum of net cash flow.
    pub fn cumulative_cash_flow(&self) -> Vec<Money> {
        self.net_cash_flow
            .iter()
            .scan(Decimal::ZERO, |running, cf| {
                *running += cf;
                Some(*running)
            })
            .collect()
    }

    /// `{year, net, cumulative}` rows for tables, charts and export.
    pub fn cash_flow_rows(&self) -> Vec<CashFlowRow> {
        self.net_cash_flow
            .iter()
            .zip(self.cumulative_cash_flow())
            .enumerate()
            .map(|(year, (net, cumulative))| CashFlowRow {
                year: year as u32,
                net_cash_flow: *net,
                cumulative_cash_flow: cumulative,
            })
            .collect()
    }

    pub fn years(&self) -> Vec<TimelineYear> {
        self.cumulative_cash_flow()
            .into_iter()
            .enumerate()
            .map(|(t, cumulative)| TimelineYear {
                year: t as u32,
                generation_mwh: self.generation_mwh[t],
                storage_discharge_mwh: self.storage_discharge_mwh[t],
                revenue: self.revenue[t],
                operating_cost: self.operating_cost[t],
                ebitda: self.ebitda[t],
                tax: self.tax[t],
                net_cash_flow: self.net_cash_flow[t],
                cumulative_cash_flow: cumulative,
            })
            .collect()
    }

    /// Lifetime generation plus storage discharge.
    pub fn total_energy_mwh(&self) -> MegawattHours {
        self.generation_mwh.iter().sum::<Decimal>() + self.storage_discharge_mwh.iter().sum::<Decimal>()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Turn yearly energy volumes into revenue, operating cost, tax and net cash
/// flow.
///
/// Prices and costs are indexed with `(1 + inflation)^(t - 1)`, so the first
/// calendar year of operation is priced at today's values when there is no
/// delay. Revenue is derated when the imbalance risk is set; storage charging
/// is bought at the wholesale price less the charging discount, floored.
#[instrument(skip_all)]
pub fn project_cashflows(
    config: &ProjectConfiguration,
    production: &ProductionProfile,
) -> AppraisalResult<YearlyTimeline> {
    let horizon = config.horizon_len();
    if production.generation_mwh.len() != horizon || production.storage_discharge_mwh.len() != horizon {
        return Err(AppraisalError::InsufficientData(format!(
            "Production profile must cover {horizon} years (0..={})",
            config.lifetime_years
        )));
    }

    let assumptions = &config.assumptions;
    let storage = &assumptions.storage;
    let commissioning_year = production.commissioning_year as usize;
    let installed_mw = config.generation_capacity_mw + config.storage_power_mw;
    let has_storage = config.has_storage();

    let mut revenue = vec![Decimal::ZERO; horizon];
    let mut operating_cost = vec![Decimal::ZERO; horizon];
    let mut ebitda = vec![Decimal::ZERO; horizon];
    let mut tax = vec![Decimal::ZERO; horizon];
    let mut net_cash_flow = vec![Decimal::ZERO; horizon];

    // ── Year 0: capital outlay only ──────────────────────────────────
    let total_capex = config.total_capex();
    net_cash_flow[0] = -total_capex;

    // ── Operating years ──────────────────────────────────────────────
    let escalation = Decimal::ONE + config.inflation_rate;
    let mut inflation = Decimal::ONE;

    for t in 1..horizon {
        if t > 1 {
            inflation *= escalation;
        }
        if t < commissioning_year {
            continue;
        }

        let generated = production.generation_mwh[t];
        let discharged = production.storage_discharge_mwh[t];

        // Revenue: energy sales, storage arbitrage, ancillary availability
        let mut year_revenue = generated * config.wholesale_price_per_mwh * inflation;
        if has_storage {
            year_revenue += discharged * config.arbitrage_spread_per_mwh * inflation;
            year_revenue += config.storage_power_mw
                * assumptions.hours_per_year
                * storage.ancillary_availability
                * config.ancillary_price_per_mw_hour
                * inflation;
        }
        if config.risks.imbalance_penalty {
            year_revenue *= assumptions.imbalance_revenue_factor;
        }

        // OpEx: fixed per installed MW, plus grid energy bought to charge storage
        let mut year_cost = installed_mw * config.fixed_opex_per_mw_year * inflation;
        if discharged > Decimal::ZERO {
            let energy_drawn = discharged / storage.round_trip_efficiency;
            let charging_price = (config.wholesale_price_per_mwh - storage.charging_price_discount)
                .max(storage.charging_price_floor);
            year_cost += energy_drawn * charging_price * inflation;
        }

        let year_ebitda = year_revenue - year_cost;
        let year_tax = (year_ebitda * config.tax_rate).max(Decimal::ZERO);

        revenue[t] = year_revenue;
        operating_cost[t] = year_cost;
        ebitda[t] = year_ebitda;
        tax[t] = year_tax;
        net_cash_flow[t] = year_ebitda - year_tax;
    }

    debug!(
        total_capex = %total_capex,
        lifetime_revenue = %revenue.iter().sum::<Decimal>(),
        "Projected cash flows"
    );

    Ok(YearlyTimeline {
        commissioning_year: production.commissioning_year,
        total_capex,
        generation_mwh: production.generation_mwh.clone(),
        storage_discharge_mwh: production.storage_discharge_mwh.clone(),
        revenue,
        operating_cost,
        ebitda,
        tax,
        net_cash_flow,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectType;
    use crate::simulation::production::simulate_production;
    use rust_decimal_macros::dec;

    fn solar_no_risk() -> ProjectConfiguration {
        let mut cfg = ProjectType::Solar.default_configuration();
        cfg.risks.imbalance_penalty = false;
        cfg
    }

    fn timeline_for(cfg: &ProjectConfiguration) -> YearlyTimeline {
        project_cashflows(cfg, &simulate_production(cfg)).unwrap()
    }

    #[test]
    fn test_year_zero_is_capex_only() {
        let timeline = timeline_for(&solar_no_risk());
        assert_eq!(timeline.len(), 21);
        assert_eq!(timeline.net_cash_flow[0], dec!(-2_750_000));
        assert_eq!(timeline.revenue[0], Decimal::ZERO);
        assert_eq!(timeline.operating_cost[0], Decimal::ZERO);
        assert_eq!(timeline.tax[0], Decimal::ZERO);
    }

    #[test]
    fn test_first_year_priced_without_inflation() {
        let timeline = timeline_for(&solar_no_risk());
        // 6132 MWh * 80 * 1.02^0
        assert_eq!(timeline.revenue[1], dec!(490_560));
        // 5 MW * 12_000
        assert_eq!(timeline.operating_cost[1], dec!(60_000));
        assert_eq!(timeline.ebitda[1], dec!(430_560));
        assert_eq!(timeline.tax[1], dec!(77_500.80));
        assert_eq!(timeline.net_cash_flow[1], dec!(353_059.20));
    }

    #[test]
    fn test_second_year_indexed() {
        let timeline = timeline_for(&solar_no_risk());
        let expected = dec!(6132) * dec!(0.995) * dec!(80) * dec!(1.02);
        assert_eq!(timeline.revenue[2], expected);
        assert_eq!(timeline.operating_cost[2], dec!(61_200));
    }

    #[test]
    fn test_imbalance_risk_derates_revenue() {
        let mut cfg = solar_no_risk();
        cfg.risks.imbalance_penalty = true;
        let timeline = timeline_for(&cfg);
        assert_eq!(timeline.revenue[1], dec!(490_560) * dec!(0.92));
        // Costs are untouched
        assert_eq!(timeline.operating_cost[1], dec!(60_000));
    }

    #[test]
    fn test_delay_keeps_year_one_empty_and_indexes_from_year_two() {
        let mut cfg = solar_no_risk();
        cfg.risks.connection_delay = true;
        let timeline = timeline_for(&cfg);
        assert_eq!(timeline.commissioning_year, 2);
        assert_eq!(timeline.net_cash_flow[1], Decimal::ZERO);
        assert_eq!(timeline.operating_cost[1], Decimal::ZERO);
        assert_eq!(timeline.revenue[2], dec!(490_560) * dec!(1.02));
    }

    #[test]
    fn test_storage_revenue_and_charging_cost() {
        let mut cfg = ProjectType::Storage.default_configuration();
        cfg.risks.imbalance_penalty = false;
        let timeline = timeline_for(&cfg);

        // 1200 MWh * 40 spread + 2 MW * 8760 * 0.9 * 20
        let expected_revenue = dec!(48_000) + dec!(315_360);
        assert_eq!(timeline.revenue[1], expected_revenue);

        // 2 MW * 12_000 + 1200 / 0.85 * (80 - 40)
        let expected_cost = dec!(24_000) + dec!(1200) / dec!(0.85) * dec!(40);
        assert!((timeline.operating_cost[1] - expected_cost).abs() < dec!(0.0001));
    }

    #[test]
    fn test_charging_price_floor() {
        let mut cfg = ProjectType::Storage.default_configuration();
        cfg.wholesale_price_per_mwh = dec!(45);
        cfg.ancillary_price_per_mw_hour = Decimal::ZERO;
        let timeline = timeline_for(&cfg);
        // max(10, 45 - 40) = 10
        let expected_cost = dec!(24_000) + dec!(1200) / dec!(0.85) * dec!(10);
        assert!((timeline.operating_cost[1] - expected_cost).abs() < dec!(0.0001));
    }

    #[test]
    fn test_charging_floor_applies_before_indexation() {
        let mut cfg = ProjectType::Storage.default_configuration();
        cfg.wholesale_price_per_mwh = dec!(45);
        cfg.ancillary_price_per_mw_hour = Decimal::ZERO;
        let timeline = timeline_for(&cfg);
        // max(10, 45 - 40) * 1.02, not max(10, (45 - 40) * 1.02)
        let drawn = timeline.storage_discharge_mwh[2] / dec!(0.85);
        let expected_cost = dec!(24_000) * dec!(1.02) + drawn * dec!(10) * dec!(1.02);
        assert!((timeline.operating_cost[2] - expected_cost).abs() < dec!(0.0001));
    }

    #[test]
    fn test_loss_making_year_pays_no_tax() {
        let mut cfg = solar_no_risk();
        cfg.wholesale_price_per_mwh = dec!(1);
        let timeline = timeline_for(&cfg);
        assert!(timeline.ebitda[1] < Decimal::ZERO);
        assert_eq!(timeline.tax[1], Decimal::ZERO);
        assert_eq!(timeline.net_cash_flow[1], timeline.ebitda[1]);
    }

    #[test]
    fn test_cash_flow_rows_accumulate() {
        let timeline = timeline_for(&solar_no_risk());
        let rows = timeline.cash_flow_rows();
        assert_eq!(rows.len(), 21);
        assert_eq!(rows[0].cumulative_cash_flow, dec!(-2_750_000));
        assert_eq!(
            rows[1].cumulative_cash_flow,
            dec!(-2_750_000) + dec!(353_059.20)
        );
        let last = rows.last().unwrap();
        assert_eq!(last.year, 20);
        assert_eq!(
            last.cumulative_cash_flow,
            timeline.net_cash_flow.iter().sum::<Decimal>()
        );
    }

    #[test]
    fn test_mismatched_profile_rejected() {
        let cfg = solar_no_risk();
        let mut profile = simulate_production(&cfg);
        profile.generation_mwh.pop();
        assert!(project_cashflows(&cfg, &profile).is_err());
    }
}
