//! Token and chain metadata from the assets GraphQL API.

use serde::{Deserialize, Serialize};

use crate::address::capitalize;
use crate::error::TokenInfoError;

pub const TOKEN_INFO_QUERY: &str = r#"
query Token($chain: Chain!, $address: Address) {
    token(input: { chain: $chain, address: $address }) {
        token { id address name symbol decimals logoURI links { name url } }
    }
    chain: token(input: { chain: $chain }) {
        info: token { name explorer }
    }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Token {
    pub id: String,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    #[serde(default)]
    pub links: Option<Vec<TokenLink>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainInfo {
    pub name: String,
    /// Base URL of the chain's block explorer.
    pub explorer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub token: Token,
    pub chain: ChainInfo,
}

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

#[derive(Debug, Deserialize)]
struct Data {
    token: TokenNode,
    chain: ChainNode,
}

#[derive(Debug, Deserialize)]
struct TokenNode {
    token: Token,
}

#[derive(Debug, Deserialize)]
struct ChainNode {
    info: ChainInfo,
}

/// The request body asking for `address` on `chain`. Chain names are sent
/// capitalized (`ethereum` becomes `Ethereum`).
pub fn token_info_request(chain: &str, address: &str) -> serde_json::Value {
    serde_json::json!({
        "query": TOKEN_INFO_QUERY,
        "variables": { "address": address, "chain": capitalize(chain) },
        "operationName": "Token",
    })
}

pub fn parse_token_info(json: &str) -> Result<TokenInfo, TokenInfoError> {
    let response: Response = serde_json::from_str(json)?;
    if !response.errors.is_empty() {
        return Err(TokenInfoError::GraphQl(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    let data = response.data.ok_or(TokenInfoError::MissingData)?;
    Ok(TokenInfo {
        token: data.token.token,
        chain: data.chain.info,
    })
}
