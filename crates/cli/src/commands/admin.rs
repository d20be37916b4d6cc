//! Admin console commands.
//!
//! # Usage
//!
//! ```bash
//! oak --scope admin admin list products
//! oak --scope admin admin list products --where category_id=3
//! oak --scope admin admin get students 7
//! oak --scope admin admin delete quotes 9
//! ```

use oakline_admin::{AdminClient, ResourceKind};
use oakline_core::AccessScope;

use super::{Context, print_json, print_line};

fn client(ctx: &Context) -> AdminClient {
    if ctx.scope != AccessScope::Admin {
        tracing::warn!("Admin commands usually need `--scope admin`");
    }
    AdminClient::new(ctx.session.api().clone())
}

/// List records, optionally filtered.
pub async fn list(
    ctx: &Context,
    kind: ResourceKind,
    filters: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    let query: Vec<(&str, &str)> = filters
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let records = client(ctx).resource(kind).list(&query).await?;
    print_json(&records);
    Ok(())
}

/// Show one record.
pub async fn get(ctx: &Context, kind: ResourceKind, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let record = client(ctx).resource(kind).get(id).await?;
    print_json(&record);
    Ok(())
}

/// Delete one record.
pub async fn delete(
    ctx: &Context,
    kind: ResourceKind,
    id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    client(ctx).resource(kind).delete(id).await?;
    print_line(&format!("Deleted {kind} {id}"));
    Ok(())
}

/// Parse a `key=value` filter.
///
/// # Errors
///
/// Returns a message if `=` is missing or the key is empty.
pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("category_id=3").unwrap(),
            ("category_id".to_string(), "3".to_string())
        );
        assert_eq!(
            parse_filter("q=oak=walnut").unwrap(),
            ("q".to_string(), "oak=walnut".to_string())
        );
        assert!(parse_filter("=3").is_err());
        assert!(parse_filter("category_id").is_err());
    }
}
