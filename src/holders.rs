//! Token holders and transfers from the analytics GraphQL response, and their
//! annotation with wallet labels.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

use crate::address::{truncate, Position};
use crate::error::HoldersError;
use crate::labels::AccountLabels;
use crate::{BatchFn, Scope};

#[derive(Debug, Deserialize)]
struct Response {
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct Data {
    #[serde(default)]
    token_holders: Option<Vec<RawHolder>>,
    #[serde(default)]
    track_transfers_between_holders: Option<Vec<RawTransfer>>,
}

#[derive(Debug, Deserialize)]
struct RawHolder {
    wallet: String,
    amount: String,
    percent: String,
}

#[derive(Debug, Deserialize)]
struct RawTransfer {
    source: String,
    target: String,
    amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHolder {
    pub wallet: String,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub source: String,
    pub target: String,
    pub amount: f64,
}

/// Holders and the transfers between them, wallets lowercased.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HolderGraph {
    pub holders: Vec<TokenHolder>,
    pub transfers: Vec<Transfer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledHolder {
    #[serde(flatten)]
    pub holder: TokenHolder,
    pub labels: Option<AccountLabels>,
}

impl LabeledHolder {
    /// The wallet's name tag, or its shortened address.
    pub fn display_name(&self) -> String {
        match self.labels.as_ref().and_then(|l| l.name.as_ref()) {
            Some(name) => name.clone(),
            None => truncate(&self.holder.wallet, 8, Position::Middle),
        }
    }
}

/// Parses the `TokenHoldersByTransfers` response. Self-transfers are dropped.
pub fn parse_holders(json: &str) -> Result<HolderGraph, HoldersError> {
    let response: Response = serde_json::from_str(json)?;
    if !response.errors.is_empty() {
        return Err(HoldersError::GraphQl(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    let data = response.data.unwrap_or_default();

    let holders = data
        .token_holders
        .unwrap_or_default()
        .into_iter()
        .map(|h| {
            Ok(TokenHolder {
                wallet: h.wallet.to_lowercase(),
                amount: parse_number("amount", &h.amount)?,
                percent: parse_number("percent", &h.percent)?,
            })
        })
        .collect::<Result<Vec<_>, HoldersError>>()?;

    let mut transfers = Vec::new();
    for t in data.track_transfers_between_holders.unwrap_or_default() {
        let transfer = Transfer {
            source: t.source.to_lowercase(),
            target: t.target.to_lowercase(),
            amount: parse_number("amount", &t.amount)?,
        };
        if transfer.source != transfer.target {
            transfers.push(transfer);
        }
    }

    Ok(HolderGraph { holders, transfers })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, HoldersError> {
    value
        .trim()
        .parse()
        .map_err(|_| HoldersError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Labels every holder, fetching all wallets in one window of `scope`
/// (usually a [`LabelScope`](crate::LabelScope)).
///
/// A failed label fetch leaves the affected holders unlabeled.
pub async fn annotate_holders<F>(
    scope: &Scope<String, AccountLabels, F>,
    holders: Vec<TokenHolder>,
) -> Vec<LabeledHolder>
where
    F: BatchFn<String, AccountLabels> + Send + 'static,
    F::Error: Debug + Display + Send + Sync + 'static,
{
    let wallets = holders.iter().map(|h| h.wallet.clone()).collect();
    let outcomes = scope.resolve_many(wallets).await;
    holders
        .into_iter()
        .zip(outcomes)
        .map(|(holder, outcome)| {
            let labels = outcome.unwrap_or_else(|e| {
                tracing::warn!(wallet = %holder.wallet, error = %e, "omitting labels");
                None
            });
            LabeledHolder { holder, labels }
        })
        .collect()
}
