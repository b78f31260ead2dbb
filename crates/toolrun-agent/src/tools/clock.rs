//! Clock tool — reports the current date and time.

use async_trait::async_trait;
use chrono::{Local, Utc};
use serde::Deserialize;

use super::base::{ParamSpec, ParamType, Tool};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    #[default]
    Utc,
    Local,
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrentTimeArgs {
    #[serde(default)]
    pub timezone: Option<Timezone>,
}

/// Returns the current time as RFC 3339.
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    type Args = CurrentTimeArgs;

    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time in RFC 3339 format."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::optional(
            "timezone",
            ParamType::String,
            "Which clock to read (default: utc)",
        )
        .one_of(&["utc", "local"])]
    }

    async fn call(&self, args: CurrentTimeArgs) -> anyhow::Result<String> {
        Ok(match args.timezone.unwrap_or_default() {
            Timezone::Utc => Utc::now().to_rfc3339(),
            Timezone::Local => Local::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_default_is_utc() {
        let out = CurrentTimeTool.call(CurrentTimeArgs::default()).await.unwrap();
        let parsed = DateTime::parse_from_rfc3339(&out).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[tokio::test]
    async fn test_local_parses() {
        let out = CurrentTimeTool
            .call(CurrentTimeArgs {
                timezone: Some(Timezone::Local),
            })
            .await
            .unwrap();
        assert!(DateTime::parse_from_rfc3339(&out).is_ok());
    }

    #[test]
    fn test_schema_lists_choices() {
        let params = CurrentTimeTool.parameters();
        assert_eq!(params[0].allowed, vec!["utc", "local"]);
        assert!(!params[0].required);
    }
}
