use std::fmt::{Display, Formatter};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

pub type TemplateRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateType {
    Base,
    Blast,
    Triggered,
    Workflow,
}

impl Display for TemplateType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateType::Base => write!(f, "Base"),
            TemplateType::Blast => write!(f, "Blast"),
            TemplateType::Triggered => write!(f, "Triggered"),
            TemplateType::Workflow => write!(f, "Workflow"),
        }
    }
}

/// Filters applied to every template list call.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub template_types: Vec<TemplateType>,
    pub message_medium: String,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
}

impl ListQuery {
    pub fn params(&self, template_type: TemplateType) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("templateType", template_type.to_string()),
            ("messageMedium", self.message_medium.clone()),
        ];

        if let Some(start) = self.start_date_time {
            params.push((
                "startDateTime",
                start.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        if let Some(end) = self.end_date_time {
            params.push(("endDateTime", end.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }

        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub template_id: u64,
    #[serde(default, deserialize_with = "category_id")]
    pub message_type_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateListResponse {
    #[serde(default)]
    pub templates: Vec<TemplateSummary>,
}

/// Accepts a message type id sent either as a JSON number or a string.
fn category_id<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;

    Ok(match value {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Removes the inline HTML body from a full record, leaving only metadata.
pub fn split_html(mut record: TemplateRecord) -> (TemplateRecord, String) {
    let html = match record.remove("html") {
        Some(Value::String(html)) => html,
        _ => String::new(),
    };

    (record, html)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPayload {
    pub client_template_id: Value,
    pub name: Value,
    pub from_name: Value,
    pub from_email: Value,
    pub reply_to_email: Value,
    pub subject: Value,
    pub preheader_text: Value,
    pub cc_emails: Value,
    pub bcc_emails: Value,
    pub html: String,
    pub plain_text: Value,
    pub google_analytics_campaign_name: Value,
    pub link_params: Value,
    pub data_feed_id: Value,
    pub data_feed_ids: Value,
    pub cache_data_feed: Value,
    pub merge_data_feed_context: Value,
    pub message_type_id: Value,
    pub is_default_locale: Value,
    pub message_medium: Value,
}

impl UpsertPayload {
    /// Fills every upsert field from local metadata, defaulting what is absent.
    /// The HTML always comes from the local HTML file.
    pub fn from_local(metadata: &TemplateRecord, html: &str) -> Self {
        let field = |key: &str, default: Value| metadata.get(key).cloned().unwrap_or(default);

        Self {
            client_template_id: field("clientTemplateId", json!("")),
            name: field("name", json!("")),
            from_name: field("fromName", json!("")),
            from_email: field("fromEmail", json!("")),
            reply_to_email: field("replyToEmail", json!("")),
            subject: field("subject", json!("")),
            preheader_text: field("preheaderText", json!("")),
            cc_emails: field("ccEmails", json!([])),
            bcc_emails: field("bccEmails", json!([])),
            html: html.to_string(),
            plain_text: field("plainText", json!("")),
            google_analytics_campaign_name: field("googleAnalyticsCampaignName", json!("")),
            link_params: field("linkParams", json!([])),
            data_feed_id: field("dataFeedId", json!(0)),
            data_feed_ids: field("dataFeedIds", json!([])),
            cache_data_feed: field("cacheDataFeed", json!({})),
            merge_data_feed_context: field("mergeDataFeedContext", json!(true)),
            message_type_id: field("messageTypeId", json!(0)),
            is_default_locale: field("isDefaultLocale", json!(true)),
            message_medium: field("messageMedium", json!({})),
        }
    }
}

/// Full record for the update endpoint: local metadata with the HTML injected.
pub fn with_html(metadata: &TemplateRecord, html: &str) -> TemplateRecord {
    let mut record = metadata.clone();
    record.insert("html".to_string(), Value::String(html.to_string()));
    record
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdUpdate {
    pub template_id: u64,
    pub client_template_id: String,
}
