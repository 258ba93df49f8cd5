//! Cost configuration snapshot
//!
//! The stored document is deliberately partial: administrators fill it in over
//! time. [`Configuration::resolve`] turns it into the fully populated
//! [`CostParameters`] the cost engine runs on, or lists everything still missing.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{WorkflowError, WorkflowResult};
use crate::types::Currency;

/// Volumetric capacity of a standard 40' high-cube container, in m³
pub const STANDARD_CONTAINER_CBM: Decimal = Decimal::from_parts(68, 0, 0, false, 0);

/// Process-wide cost configuration as stored
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Configuration {
    pub exchange_rates: ExchangeRates,
    /// Shared container capacity in m³; absent means the standard 68 m³
    pub container_cbm: Option<Decimal>,
    pub fixed_costs_usd: FixedUsdCosts,
    /// Per-container fixed costs billed in the local currency
    pub fixed_costs_local: BTreeMap<String, Decimal>,
    pub variable_costs: VariableCosts,
    pub marketplace: MarketplaceSchedule,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeRates {
    pub rmb_to_usd: Option<Decimal>,
    pub usd_to_local: Option<Decimal>,
}

/// Per-container fixed costs billed in USD
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FixedUsdCosts {
    pub ocean_freight: Option<Decimal>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Decimal>,
}

/// Percentages, all stored as fractions in [0, 1]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VariableCosts {
    pub supplier_commission: Option<Decimal>,
    pub container_insurance: Option<Decimal>,
    pub import_duty: Option<Decimal>,
    pub vat: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketplaceSchedule {
    pub commission_pct: Option<Decimal>,
    /// At or above this price the shipping cost applies
    pub shipping_threshold: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    /// At or above this price (and below the shipping threshold) the medium charge applies
    pub medium_threshold: Option<Decimal>,
    pub medium_charge: Option<Decimal>,
    pub low_charge: Option<Decimal>,
}

/// Fully resolved marketplace fee schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketplaceFees {
    pub commission_pct: Decimal,
    pub shipping_threshold: Decimal,
    pub shipping_cost: Decimal,
    pub medium_threshold: Decimal,
    pub medium_charge: Decimal,
    pub low_charge: Decimal,
}

/// Every figure the cost engine needs, all present and usable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostParameters {
    pub rmb_to_usd: Decimal,
    pub usd_to_local: Decimal,
    pub container_cbm: Decimal,
    pub ocean_freight_usd: Decimal,
    /// Sum of USD fixed costs other than ocean freight
    pub other_fixed_usd: Decimal,
    /// Sum of local-currency fixed costs
    pub fixed_local: Decimal,
    pub supplier_commission: Decimal,
    pub container_insurance: Decimal,
    pub import_duty: Decimal,
    pub vat: Decimal,
    pub marketplace: MarketplaceFees,
}

impl CostParameters {
    /// Rate converting one unit of `currency` into USD
    pub fn rate_to_usd(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Rmb => self.rmb_to_usd,
            Currency::Usd => Decimal::ONE,
        }
    }
}

/// Accumulates the dotted names of missing or unusable fields
struct Missing(Vec<String>);

impl Missing {
    fn positive(&mut self, name: &str, value: Option<Decimal>) -> Decimal {
        match value {
            Some(v) if v > Decimal::ZERO => v,
            _ => {
                self.0.push(name.to_string());
                Decimal::ZERO
            }
        }
    }

    fn non_negative(&mut self, name: &str, value: Option<Decimal>) -> Decimal {
        match value {
            Some(v) if v >= Decimal::ZERO => v,
            _ => {
                self.0.push(name.to_string());
                Decimal::ZERO
            }
        }
    }

    fn fraction(&mut self, name: &str, value: Option<Decimal>) -> Decimal {
        match value {
            Some(v) if v >= Decimal::ZERO && v <= Decimal::ONE => v,
            _ => {
                self.0.push(name.to_string());
                Decimal::ZERO
            }
        }
    }

    fn pooled(&mut self, prefix: &str, costs: &BTreeMap<String, Decimal>) -> Decimal {
        let mut total = Decimal::ZERO;
        for (key, value) in costs {
            if *value < Decimal::ZERO {
                self.0.push(format!("{}.{}", prefix, key));
            } else {
                total += *value;
            }
        }
        total
    }
}

impl Configuration {
    /// Capacity used to pro-rate container costs
    pub fn container_capacity(&self) -> Decimal {
        self.container_cbm.unwrap_or(STANDARD_CONTAINER_CBM)
    }

    /// Rate converting `currency` into USD, if configured
    pub fn rate_to_usd(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Rmb => self.exchange_rates.rmb_to_usd.filter(|r| *r > Decimal::ZERO),
            Currency::Usd => Some(Decimal::ONE),
        }
    }

    /// Resolve into the parameters the cost engine runs on.
    ///
    /// Fails closed: every missing or out-of-range required field is reported
    /// at once, never defaulted to zero.
    pub fn resolve(&self) -> WorkflowResult<CostParameters> {
        let mut missing = Missing(Vec::new());

        let rmb_to_usd = missing.positive("exchange_rates.rmb_to_usd", self.exchange_rates.rmb_to_usd);
        let usd_to_local =
            missing.positive("exchange_rates.usd_to_local", self.exchange_rates.usd_to_local);
        let container_cbm = missing.positive("container_cbm", Some(self.container_capacity()));
        let ocean_freight_usd =
            missing.non_negative("fixed_costs_usd.ocean_freight", self.fixed_costs_usd.ocean_freight);
        let other_fixed_usd = missing.pooled("fixed_costs_usd", &self.fixed_costs_usd.other);
        let fixed_local = missing.pooled("fixed_costs_local", &self.fixed_costs_local);

        let vc = &self.variable_costs;
        let supplier_commission =
            missing.fraction("variable_costs.supplier_commission", vc.supplier_commission);
        let container_insurance =
            missing.fraction("variable_costs.container_insurance", vc.container_insurance);
        let import_duty = missing.fraction("variable_costs.import_duty", vc.import_duty);
        let vat = missing.fraction("variable_costs.vat", vc.vat);

        let mp = &self.marketplace;
        let marketplace = MarketplaceFees {
            commission_pct: missing.fraction("marketplace.commission_pct", mp.commission_pct),
            shipping_threshold: missing
                .non_negative("marketplace.shipping_threshold", mp.shipping_threshold),
            shipping_cost: missing.non_negative("marketplace.shipping_cost", mp.shipping_cost),
            medium_threshold: missing
                .non_negative("marketplace.medium_threshold", mp.medium_threshold),
            medium_charge: missing.non_negative("marketplace.medium_charge", mp.medium_charge),
            low_charge: missing.non_negative("marketplace.low_charge", mp.low_charge),
        };

        if !missing.0.is_empty() {
            return Err(WorkflowError::ConfigurationIncomplete { missing: missing.0 });
        }

        Ok(CostParameters {
            rmb_to_usd,
            usd_to_local,
            container_cbm,
            ocean_freight_usd,
            other_fixed_usd,
            fixed_local,
            supplier_commission,
            container_insurance,
            import_duty,
            vat,
            marketplace,
        })
    }
}
