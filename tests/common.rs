use std::path::Path;

use serde_json::{Value, json};
use template_sync::{
    clients::store::LocalTemplateStore,
    config::Config,
    models::template::{TemplateRecord, TemplateType},
};

pub const API_KEY: &str = "test-api-key";
pub const GITHUB_TOKEN: &str = "gh-test-token";
pub const REPO: &str = "acme/email-templates";

pub const CART_FOLDER: &str = "src/templates/email/marketing/cartReminders_64268";
pub const NEWSLETTER_FOLDER: &str = "src/templates/email/marketing/weeklyNewsletter_64267";

/// Config pointing every remote at `server_uri` and the store at `root`.
pub fn test_config(server_uri: &str, root: &Path) -> Config {
    let mut config = Config::with_api_key(API_KEY);
    config.iterable_base_url = server_uri.to_string();
    config.github_api_url = server_uri.to_string();
    config.github_repo = Some(REPO.to_string());
    config.github_token = Some(GITHUB_TOKEN.to_string());
    config.template_root = root.to_path_buf();
    config.template_types = vec![TemplateType::Base];
    config.http_timeout_seconds = 5;
    config
}

pub fn record(value: Value) -> TemplateRecord {
    value
        .as_object()
        .cloned()
        .expect("test record must be a JSON object")
}

/// Writes a local pair whose metadata carries `name` and `clientTemplateId`.
pub fn write_local(store: &LocalTemplateStore, folder: &str, name: &str) -> String {
    let metadata = record(json!({
        "name": name,
        "clientTemplateId": name,
        "subject": format!("{} subject", name),
    }));

    store
        .write(folder, name, &metadata, &format!("<p>{}</p>", name))
        .expect("failed to write local template")
}
