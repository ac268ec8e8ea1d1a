//! Sector Flow Calculations
//!
//! Per-industry net flows of the four investor classes for one execution type.

use analytics::group_sum_columns;
use market_core::{ExecutionType, FlowColumn, InvestorClass, InvestorFlowRecord};
use serde::Serialize;

/// Net flows of all investor classes into one industry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryFlow {
    pub industry: String,
    pub execution: ExecutionType,
    /// Indexed like `InvestorClass::ALL`
    pub by_class: [f64; 4],
    pub total: f64,
}

/// One segment of a stacked industry bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryFlowBar {
    pub industry: String,
    pub class: InvestorClass,
    pub value: f64,
}

/// Sum the class columns of `execution` per industry, largest total first.
///
/// Ties keep ascending industry order. Rows without an industry are ignored.
pub fn industry_flows(rows: &[InvestorFlowRecord], execution: ExecutionType) -> Vec<IndustryFlow> {
    let columns = InvestorClass::ALL.map(|class| FlowColumn::new(class, execution));

    let mut flows: Vec<IndustryFlow> = group_sum_columns(
        rows,
        |r| r.industry.clone(),
        |r| columns.map(|c| r.net(c)),
    )
    .into_iter()
    .map(|(industry, by_class)| IndustryFlow {
        industry,
        execution,
        by_class,
        total: by_class.iter().sum(),
    })
    .collect();

    flows.sort_by(|a, b| b.total.total_cmp(&a.total));
    flows
}

/// Long form for stacked bars: one row per (class, industry), class-major
pub fn melt_industry_flows(flows: &[IndustryFlow]) -> Vec<IndustryFlowBar> {
    InvestorClass::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, &class)| {
            flows.iter().map(move |flow| IndustryFlowBar {
                industry: flow.industry.clone(),
                class,
                value: flow.by_class[i],
            })
        })
        .collect()
}
