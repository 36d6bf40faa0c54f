//! Database, collection, and bucket layout, plus the provisioning run used
//! by `folio setup`.
//!
//! Provisioning is idempotent: anything that already exists (HTTP 409) is
//! reported and skipped, so a half-finished setup can simply be re-run.

use folio_appwrite::{AppwriteError, AttributeSpec, BucketSpec, RestClient, permission};
use folio_common::config::{AppConfig, LEGACY_KEYS};
use folio_common::error::FolioResult;
use folio_common::models::JobStatus;
use serde_json::Value;
use std::fmt::Write as _;

use crate::backend::map_appwrite_error;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "svg", "avif"];
const DOCUMENT_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

#[derive(Debug, Clone)]
pub struct CollectionSchema {
    pub id: String,
    pub name: &'static str,
    pub permissions: Vec<String>,
    pub attributes: Vec<AttributeSpec>,
}

/// Public content: anyone reads, signed-in users write.
fn public_read() -> Vec<String> {
    vec![
        permission::read_any(),
        permission::create_users(),
        permission::update_users(),
        permission::delete_users(),
    ]
}

/// Admin-only content.
fn private() -> Vec<String> {
    vec![
        permission::read_users(),
        permission::create_users(),
        permission::update_users(),
        permission::delete_users(),
    ]
}

/// Every collection the application uses, under the configured IDs.
pub fn collections(config: &AppConfig) -> Vec<CollectionSchema> {
    let ids = &config.collections;
    let statuses: Vec<&str> = JobStatus::ALL.iter().map(|s| s.as_str()).collect();

    vec![
        CollectionSchema {
            id: ids.personal.clone(),
            name: "Personal",
            permissions: public_read(),
            attributes: vec![
                AttributeSpec::string("name", 128).required(),
                AttributeSpec::string("title", 128).required(),
                AttributeSpec::string("bio", 5000),
                AttributeSpec::email("email").required(),
                AttributeSpec::string("phone", 32),
                AttributeSpec::string("location", 128),
                AttributeSpec::string("avatar", 64),
                AttributeSpec::url("githubUrl"),
                AttributeSpec::url("linkedinUrl"),
                AttributeSpec::url("twitterUrl"),
                AttributeSpec::url("website"),
                AttributeSpec::string("skills", 64).array(),
            ],
        },
        CollectionSchema {
            id: ids.projects.clone(),
            name: "Projects",
            permissions: public_read(),
            attributes: vec![
                AttributeSpec::string("name", 128).required(),
                AttributeSpec::string("description", 5000).required(),
                AttributeSpec::string("technologies", 64).array(),
                AttributeSpec::string("coverImage", 64),
                AttributeSpec::string("images", 64).array(),
                AttributeSpec::url("githubUrl"),
                AttributeSpec::url("liveUrl"),
                AttributeSpec::boolean("featured").default_value(false),
            ],
        },
        CollectionSchema {
            id: ids.experience.clone(),
            name: "Experience",
            permissions: public_read(),
            attributes: vec![
                AttributeSpec::string("company", 128).required(),
                AttributeSpec::string("position", 128).required(),
                AttributeSpec::string("location", 128),
                AttributeSpec::string("startDate", 32).required(),
                AttributeSpec::string("endDate", 32),
                AttributeSpec::boolean("current").default_value(false),
                AttributeSpec::string("description", 5000),
                AttributeSpec::string("skills", 64).array(),
                AttributeSpec::string("companyLogo", 64),
            ],
        },
        CollectionSchema {
            id: ids.messages.clone(),
            name: "Messages",
            // Visitors submit without an account
            permissions: vec![
                permission::create_any(),
                permission::read_users(),
                permission::update_users(),
                permission::delete_users(),
            ],
            attributes: vec![
                AttributeSpec::string("name", 100).required(),
                AttributeSpec::email("email").required(),
                AttributeSpec::string("subject", 200),
                AttributeSpec::string("message", 5000).required(),
                AttributeSpec::boolean("read").default_value(false),
                AttributeSpec::boolean("archived").default_value(false),
            ],
        },
        CollectionSchema {
            id: ids.job_applications.clone(),
            name: "Job Applications",
            permissions: private(),
            attributes: vec![
                AttributeSpec::string("company", 128).required(),
                AttributeSpec::string("position", 128).required(),
                AttributeSpec::enumeration("status", &statuses)
                    .default_value(JobStatus::default().as_str()),
                AttributeSpec::string("location", 128),
                AttributeSpec::url("jobUrl"),
                AttributeSpec::string("salary", 64),
                AttributeSpec::string("notes", 5000),
                AttributeSpec::string("appliedDate", 32),
                AttributeSpec::string("fk_cv_id", 64),
            ],
        },
        CollectionSchema {
            id: ids.cvs.clone(),
            name: "CVs",
            permissions: private(),
            attributes: vec![
                AttributeSpec::string("name", 128).required(),
                AttributeSpec::string("fileId", 64).required(),
                AttributeSpec::string("fileName", 256).required(),
                AttributeSpec::boolean("isDefault").default_value(false),
            ],
        },
    ]
}

pub fn buckets(config: &AppConfig) -> Vec<BucketSpec> {
    vec![
        BucketSpec {
            id: config.buckets.images.clone(),
            name: "Images".into(),
            permissions: public_read(),
            maximum_file_size: config.limits.max_upload_bytes,
            allowed_extensions: IMAGE_EXTENSIONS.to_vec(),
        },
        BucketSpec {
            id: config.buckets.cvs.clone(),
            name: "CVs".into(),
            permissions: private(),
            maximum_file_size: config.limits.max_upload_bytes,
            allowed_extensions: DOCUMENT_EXTENSIONS.to_vec(),
        },
    ]
}

/// What a provisioning run did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProvisionReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

impl ProvisionReport {
    /// Record the outcome of one create call; 409 means "already there".
    fn note(&mut self, label: String, result: Result<Value, AppwriteError>) -> FolioResult<()> {
        match result {
            Ok(_) => {
                tracing::info!(%label, "created");
                self.created.push(label);
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(%label, "already exists");
                self.existing.push(label);
                Ok(())
            }
            Err(e) => Err(map_appwrite_error(&label, e)),
        }
    }
}

/// Create the database, every collection with its attributes, and every
/// bucket. The client must authenticate with a server API key.
pub async fn provision(client: &RestClient, config: &AppConfig) -> FolioResult<ProvisionReport> {
    let database = &config.appwrite.database;
    let mut report = ProvisionReport::default();

    let result = client.create_database(database, "Portfolio").await;
    report.note(format!("database {database}"), result)?;

    for schema in collections(config) {
        let result = client
            .create_collection(database, &schema.id, schema.name, &schema.permissions)
            .await;
        report.note(format!("collection {}", schema.id), result)?;

        // Attributes go through even for an existing collection so that
        // fields added since the last run get created
        for attribute in &schema.attributes {
            let result = client.create_attribute(database, &schema.id, attribute).await;
            report.note(format!("attribute {}.{}", schema.id, attribute.key), result)?;
        }
    }

    for bucket in buckets(config) {
        let result = client.create_bucket(&bucket).await;
        report.note(format!("bucket {}", bucket.id), result)?;
    }

    Ok(report)
}

/// Render the `.env.local` the dashboards read. The server key is only
/// written when asked for, and never under a browser-visible prefix.
pub fn env_file(config: &AppConfig, include_api_key: bool) -> String {
    let mut out = String::from("# Written by `folio setup`\n");
    for (suffix, key) in LEGACY_KEYS {
        let value = match key {
            "appwrite.endpoint" => config.appwrite.endpoint.as_str(),
            "appwrite.project" => config.appwrite.project.as_str(),
            "appwrite.database" => config.appwrite.database.as_str(),
            "collections.personal" => config.collections.personal.as_str(),
            "collections.projects" => config.collections.projects.as_str(),
            "collections.experience" => config.collections.experience.as_str(),
            "collections.messages" => config.collections.messages.as_str(),
            "collections.job_applications" => config.collections.job_applications.as_str(),
            "collections.cvs" => config.collections.cvs.as_str(),
            "buckets.images" => config.buckets.images.as_str(),
            "buckets.cvs" => config.buckets.cvs.as_str(),
            _ => continue,
        };
        let _ = writeln!(out, "NEXT_PUBLIC_APPWRITE_{suffix}={value}");
    }
    if include_api_key {
        if let Some(key) = &config.appwrite.api_key {
            let _ = writeln!(out, "FOLIO__APPWRITE__API_KEY={key}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_appwrite::ClientOptions;
    use folio_common::config::load_from;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> AppConfig {
        let mut vars = HashMap::new();
        vars.insert("FOLIO__APPWRITE__PROJECT".to_string(), "folio".to_string());
        vars.insert("FOLIO__APPWRITE__API_KEY".to_string(), "secret".to_string());
        load_from(&vars).unwrap()
    }

    #[test]
    fn messages_accept_anonymous_submissions() {
        let schemas = collections(&config());
        let messages = schemas.iter().find(|s| s.id == "messages").unwrap();
        assert!(messages.permissions.contains(&permission::create_any()));
        assert!(!messages.permissions.contains(&permission::read_any()));

        let jobs = schemas.iter().find(|s| s.id == "jobApplications").unwrap();
        assert!(!jobs.permissions.contains(&permission::read_any()));
    }

    #[test]
    fn env_file_keeps_key_private() {
        let cfg = config();
        let public = env_file(&cfg, false);
        assert!(public.contains("NEXT_PUBLIC_APPWRITE_PROJECT_ID=folio\n"));
        assert!(public.contains("NEXT_PUBLIC_APPWRITE_JOB_APPLICATIONS_COLLECTION_ID=jobApplications\n"));
        assert!(!public.contains("secret"));

        let with_key = env_file(&cfg, true);
        assert!(with_key.contains("FOLIO__APPWRITE__API_KEY=secret"));
        assert!(!with_key.contains("NEXT_PUBLIC_APPWRITE_API_KEY"));
    }

    #[tokio::test]
    async fn existing_resources_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "Database already exists",
                "type": "database_already_exists",
                "code": 409
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/(databases/.+|storage/buckets)$"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let cfg = config();
        let client = RestClient::new(
            ClientOptions::new(format!("{}/v1", server.uri()), "folio").api_key("secret"),
        )
        .unwrap();
        let report = provision(&client, &cfg).await.unwrap();

        assert_eq!(report.existing, vec!["database portfolio".to_string()]);
        let attributes: usize = collections(&cfg).iter().map(|s| s.attributes.len()).sum();
        assert_eq!(report.created.len(), 6 + attributes + 2);
    }

    #[tokio::test]
    async fn other_failures_abort() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Missing scope",
                "type": "general_unauthorized_scope",
            })))
            .mount(&server)
            .await;

        let client =
            RestClient::new(ClientOptions::new(format!("{}/v1", server.uri()), "folio")).unwrap();
        assert!(provision(&client, &config()).await.is_err());
    }
}
