//! Pure transition function: `(product, request, configuration) -> outcome`
//!
//! Nothing here performs I/O. The caller loads the product and configuration,
//! calls [`advance`], checks SKU uniqueness, attaches the container and then
//! persists the returned product and record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::payload::*;
use super::{transition_from, ProductStatus, Stage, Transition, WorkflowWarning};
use crate::costing::{analyze, mul, CostAnalysis};
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{
    is_provisional_sku, ActorRole, ApprovalDecision, Configuration, ContainerAssignment,
    Product, RateSnapshot, SkuChange, StageDetails, StageRecord,
};
use crate::replenishment::QuantityPlan;
use crate::types::{Currency, Money};

/// One attempt to move a product forward
#[derive(Debug, Clone)]
pub struct TransitionRequest<'a> {
    /// The status the caller believes the product is in
    pub expected_status: ProductStatus,
    pub payload: &'a serde_json::Value,
    pub actor: ActorRole,
    pub record_id: Uuid,
    pub now: DateTime<Utc>,
}

/// Everything an applied transition produces
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    /// The product as it should be persisted, with `record` appended
    pub product: Product,
    pub record: StageRecord,
    pub warnings: Vec<WorkflowWarning>,
    /// Present only for the shipping step
    pub container_assignment: Option<ContainerAssignment>,
    /// Present only when an approval rewrote a provisional SKU
    pub sku_change: Option<SkuChange>,
}

/// Check that `actor` may take `product` out of `expected` and return the
/// transition that applies.
///
/// Checks run in a fixed order: exclusion, status, table lookup, then role.
pub fn authorize(
    product: &Product,
    expected: ProductStatus,
    actor: ActorRole,
) -> WorkflowResult<&'static Transition> {
    if product.excluded {
        return Err(WorkflowError::ProductExcluded(product.sku.clone()));
    }
    if product.status != expected {
        return Err(WorkflowError::StatusMismatch {
            sku: product.sku.clone(),
            expected,
            current: product.status,
        });
    }
    let transition =
        transition_from(product.status).ok_or(WorkflowError::NoTransition(product.status))?;
    if !actor.can_act_as(transition.role) {
        return Err(WorkflowError::RoleNotAuthorized {
            actor,
            required: transition.role,
            from: product.status,
        });
    }
    Ok(transition)
}

/// Apply one transition. On error nothing has changed.
pub fn advance(
    product: &Product,
    request: TransitionRequest<'_>,
    config: &Configuration,
) -> WorkflowResult<TransitionOutcome> {
    let transition = authorize(product, request.expected_status, request.actor)?;

    let mut next = product.clone();
    let mut warnings = Vec::new();
    let mut container_assignment = None;
    let mut sku_change = None;

    let (next_status, details) = match transition.stage {
        Stage::Replenishment => {
            let p: ReplenishmentPayload = parse_payload(request.payload)?;
            let suggested = require(p.suggested_quantity, "suggested_quantity")?;
            next.suggested_quantity = Some(suggested);
            (
                transition.to,
                StageDetails::Replenishment {
                    suggested_quantity: suggested,
                    reason: p.reason,
                },
            )
        }
        Stage::QuoteRequest => {
            let p: QuoteRequestPayload = parse_payload(request.payload)?;
            let requested = require(
                p.requested_quantity.or(product.suggested_quantity),
                "requested_quantity",
            )?;
            next.requested_quantity = Some(requested);
            (
                transition.to,
                StageDetails::QuoteRequest {
                    requested_quantity: requested,
                    comments: p.comments,
                },
            )
        }
        Stage::Quotation => {
            let p: QuotationPayload = parse_payload(request.payload)?;
            let details = apply_quotation(&mut next, p, config)?;
            (transition.to, details)
        }
        Stage::Analysis => {
            let p: AnalysisPayload = parse_payload(request.payload)?;
            let selling_price = require_positive(p.selling_price, "selling_price")?;
            next.selling_price = Some(selling_price);
            (
                transition.to,
                StageDetails::Analysis {
                    selling_price,
                    comments: p.comments,
                    fob_price: product.fob_price,
                    unit_volume_cbm: product.unit_volume_cbm,
                },
            )
        }
        Stage::Approval => {
            let p: ApprovalPayload = parse_payload(request.payload)?;
            let approval = apply_approval(&mut next, transition, p, config, request.now)?;
            warnings = approval.warnings.clone();
            sku_change = approval.sku_change.clone();
            (approval.next_status, approval.details)
        }
        Stage::PurchaseConfirmation => {
            let p: PurchaseConfirmationPayload = parse_payload(request.payload)?;
            let confirmed = require(
                p.confirmed_quantity.or(product.approved_quantity),
                "confirmed_quantity",
            )?;
            let estimated_delivery_date =
                require(p.estimated_delivery_date, "estimated_delivery_date")?;
            next.confirmed_quantity = Some(confirmed);
            (
                transition.to,
                StageDetails::PurchaseConfirmation {
                    confirmed_quantity: confirmed,
                    estimated_delivery_date,
                    comments: p.comments,
                },
            )
        }
        Stage::Manufacturing => {
            let p: ManufacturingPayload = parse_payload(request.payload)?;
            let manufactured = require(
                p.manufactured_quantity.or(product.confirmed_quantity),
                "manufactured_quantity",
            )?;
            next.manufactured_quantity = Some(manufactured);
            (
                transition.to,
                StageDetails::Manufacturing {
                    manufactured_quantity: manufactured,
                    completion_date: p.completion_date,
                    quality_notes: p.quality_notes,
                    comments: p.comments,
                },
            )
        }
        Stage::Shipping => {
            let p: ShippingPayload = parse_payload(request.payload)?;
            let shipped = require(
                p.shipped_quantity.or(product.manufactured_quantity),
                "shipped_quantity",
            )?;
            let container_number = require(p.container_number, "container_number")?
                .trim()
                .to_string();
            if container_number.is_empty() {
                return Err(WorkflowError::invalid("container_number", "must not be blank"));
            }
            let unit_volume = require(product.unit_volume_cbm, "unit_volume_cbm")?;
            let shipped_volume_cbm = mul(unit_volume, Decimal::from(shipped), "shipped_volume_cbm")?;

            next.shipped_quantity = Some(shipped);
            next.container_number = Some(container_number.clone());
            container_assignment = Some(ContainerAssignment {
                container_number: container_number.clone(),
                sku: product.sku.clone(),
                volume_cbm: shipped_volume_cbm,
            });
            (
                transition.to,
                StageDetails::Shipping {
                    shipped_quantity: shipped,
                    container_number,
                    shipped_volume_cbm,
                    comments: p.comments,
                },
            )
        }
    };

    let record = StageRecord {
        id: request.record_id,
        previous_status: product.status,
        next_status,
        actor_role: request.actor,
        recorded_at: request.now,
        details,
    };

    next.status = next_status;
    next.updated_at = request.now;
    next.stages.push(record.clone());

    Ok(TransitionOutcome {
        product: next,
        record,
        warnings,
        container_assignment,
        sku_change,
    })
}

fn apply_quotation(
    next: &mut Product,
    p: QuotationPayload,
    config: &Configuration,
) -> WorkflowResult<StageDetails> {
    let unit_price = require_positive(p.unit_price, "unit_price")?;
    let currency = p.currency.unwrap_or(Currency::Rmb);
    let units_per_case = require(p.units_per_case, "units_per_case")?;
    let case_volume_cbm = require_positive(p.case_volume_cbm, "case_volume_cbm")?;
    let production_lead_time_days =
        require(p.production_lead_time_days, "production_lead_time_days")?;

    let unit_volume_cbm = case_volume_cbm
        .checked_div(Decimal::from(units_per_case))
        .ok_or_else(|| WorkflowError::invalid("units_per_case", "must be at least 1"))?;
    let unit_price_usd = config
        .rate_to_usd(currency)
        .map(|rate| mul(unit_price, rate, "unit_price_usd"))
        .transpose()?;

    next.fob_price = Some(Money::new(unit_price, currency));
    next.unit_volume_cbm = Some(unit_volume_cbm);
    next.units_per_case = Some(units_per_case);
    next.case_volume_cbm = Some(case_volume_cbm);
    next.minimum_order_quantity = p.minimum_order_quantity;

    Ok(StageDetails::Quotation {
        unit_price,
        currency,
        unit_price_usd,
        units_per_case,
        case_volume_cbm,
        unit_volume_cbm,
        production_lead_time_days,
        minimum_order_quantity: p.minimum_order_quantity,
        supplier_city: p.supplier_city,
        comments: p.comments,
        rates: RateSnapshot {
            rmb_to_usd: config.exchange_rates.rmb_to_usd,
            usd_to_local: config.exchange_rates.usd_to_local,
        },
    })
}

struct ApprovalResult {
    next_status: ProductStatus,
    details: StageDetails,
    warnings: Vec<WorkflowWarning>,
    sku_change: Option<SkuChange>,
}

fn apply_approval(
    next: &mut Product,
    transition: &Transition,
    p: ApprovalPayload,
    config: &Configuration,
    now: DateTime<Utc>,
) -> WorkflowResult<ApprovalResult> {
    let approved = require(p.approved, "approved")?;
    let fob = require(next.fob_price, "fob_price")?;
    let unit_volume = require(next.unit_volume_cbm, "unit_volume_cbm")?;
    let selling_price = require(next.selling_price, "selling_price")?;
    let units_per_case = require(next.units_per_case, "units_per_case")?;

    let params = config.resolve()?;
    let analysis: CostAnalysis = analyze(fob, unit_volume, selling_price, &params)?;

    let suggested = next.requested_quantity.or(next.suggested_quantity).unwrap_or(0);
    let plan = QuantityPlan::new(
        suggested,
        units_per_case,
        p.purchase_quantity,
        next.minimum_order_quantity,
    );
    if approved && plan.purchase_quantity == 0 {
        return Err(WorkflowError::MissingField("purchase_quantity".to_string()));
    }

    let sku_change = if approved {
        rewrite_sku(next, p.new_sku, now)?
    } else {
        None
    };

    let mut warnings = Vec::new();
    if plan.below_minimum_order {
        if let Some(minimum) = next.minimum_order_quantity {
            warnings.push(WorkflowWarning::BelowMinimumOrderQuantity {
                quantity: plan.purchase_quantity,
                minimum,
            });
        }
    }
    let target_purchase_price = analysis.target_purchase_price();
    if analysis.margin.below_target {
        warnings.push(WorkflowWarning::MarginBelowTarget {
            margin_pct: analysis.margin.margin_pct,
            target_margin_pct: analysis.margin.target_margin_pct,
            target_purchase_price,
        });
    }

    next.landed_cost = Some(analysis.landed_cost.landed_cost_local);
    next.projected_margin = Some(analysis.margin.margin_pct);

    let (decision, next_status) = if approved {
        next.approved_quantity = Some(plan.purchase_quantity);
        (ApprovalDecision::Approved, transition.to)
    } else {
        let rejected_to = transition.rejected_to.unwrap_or(transition.from);
        (ApprovalDecision::Rejected, rejected_to)
    };

    Ok(ApprovalResult {
        next_status,
        details: StageDetails::Approval {
            decision,
            comments: p.comments,
            suggested_quantity: plan.suggested_quantity,
            adjusted_quantity: plan.adjusted_quantity,
            purchase_quantity: plan.purchase_quantity,
            analysis,
            target_purchase_price,
            sku_change: sku_change.clone(),
            warnings: warnings.clone(),
        },
        warnings,
        sku_change,
    })
}

/// Replace a provisional SKU. Uniqueness is the caller's to enforce.
fn rewrite_sku(
    next: &mut Product,
    new_sku: Option<String>,
    now: DateTime<Utc>,
) -> WorkflowResult<Option<SkuChange>> {
    let Some(new_sku) = new_sku.map(|s| s.trim().to_string()) else {
        return Ok(None);
    };
    if new_sku.is_empty() {
        return Err(WorkflowError::invalid("new_sku", "must not be blank"));
    }
    if new_sku == next.sku {
        return Ok(None);
    }
    if !is_provisional_sku(&next.sku) {
        return Err(WorkflowError::SkuNotRewritable(next.sku.clone()));
    }

    let change = SkuChange {
        from: next.sku.clone(),
        to: new_sku.clone(),
        at: now,
    };
    next.sku = new_sku;
    Ok(Some(change))
}
