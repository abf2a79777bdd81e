// ABOUTME: System template seeding
// ABOUTME: Inserts the built-in templates at startup if they are missing

use sqlx::SqlitePool;
use tracing::info;

use proposalpilot_storage::StorageError;

use crate::types::{TemplateContent, TemplatePricing};

struct SystemTemplate {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    content: TemplateContent,
    default_pricing: Vec<TemplatePricing>,
}

fn system_templates() -> Vec<SystemTemplate> {
    vec![
        SystemTemplate {
            id: "tpl-web-project",
            name: "Web Project",
            description: "Standard structure for website and web application work",
            content: TemplateContent {
                opening_hook: Some(
                    "Thank you for sharing the details of your project. Having built similar \
                     products, we know exactly what it takes to get this right."
                        .to_string(),
                ),
                why_us: Some(
                    "We combine senior engineering with a design-first process, and we have \
                     shipped comparable projects on time and on budget."
                        .to_string(),
                ),
                next_steps: Some(
                    "Reply to this proposal to schedule a kickoff call. We can typically start \
                     within two weeks of sign-off."
                        .to_string(),
                ),
                ..Default::default()
            },
            default_pricing: vec![
                TemplatePricing {
                    name: "Essential".to_string(),
                    price: 4500.0,
                    description: Some("Core scope only".to_string()),
                },
                TemplatePricing {
                    name: "Standard".to_string(),
                    price: 8500.0,
                    description: Some("Core scope plus revisions and launch support".to_string()),
                },
                TemplatePricing {
                    name: "Premium".to_string(),
                    price: 14500.0,
                    description: Some("Everything in Standard plus 90 days of support".to_string()),
                },
            ],
        },
        SystemTemplate {
            id: "tpl-retainer",
            name: "Monthly Retainer",
            description: "Ongoing engagement pitch with monthly pricing",
            content: TemplateContent {
                opening_hook: Some(
                    "Consistent, senior-level attention on your product every month, without \
                     the overhead of hiring."
                        .to_string(),
                ),
                next_steps: Some(
                    "Pick a tier and we will send over the agreement. You can change tiers or \
                     cancel with 30 days notice."
                        .to_string(),
                ),
                ..Default::default()
            },
            default_pricing: vec![
                TemplatePricing {
                    name: "Starter".to_string(),
                    price: 2000.0,
                    description: Some("20 hours per month".to_string()),
                },
                TemplatePricing {
                    name: "Growth".to_string(),
                    price: 4500.0,
                    description: Some("50 hours per month".to_string()),
                },
            ],
        },
    ]
}

/// Insert the built-in system templates if absent. Safe to run on every
/// startup; existing rows are left untouched.
pub async fn seed_system_templates(pool: &SqlitePool) -> Result<(), StorageError> {
    let mut inserted = 0;

    for template in system_templates() {
        let content_json = serde_json::to_string(&template.content)?;
        let pricing_json = serde_json::to_string(&template.default_pricing)?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO templates (id, user_id, name, description, content, default_pricing, is_system)
            VALUES (?, NULL, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(template.id)
        .bind(template.name)
        .bind(template.description)
        .bind(&content_json)
        .bind(&pricing_json)
        .execute(pool)
        .await?;

        inserted += result.rows_affected();
    }

    if inserted > 0 {
        info!("Seeded {} system templates", inserted);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::setup_test_db;
    use crate::storage::TemplateStorage;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = setup_test_db().await;

        seed_system_templates(&pool).await.unwrap();
        seed_system_templates(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM templates WHERE is_system = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_seeded_templates_are_visible_and_parse() {
        let pool = setup_test_db().await;
        seed_system_templates(&pool).await.unwrap();

        let storage = TemplateStorage::new(pool);
        let templates = storage.list("any-user").await.unwrap();

        assert_eq!(templates.len(), 2);
        assert!(templates.iter().all(|t| t.is_system));

        let web = templates.iter().find(|t| t.id == "tpl-web-project").unwrap();
        assert_eq!(web.default_pricing.as_ref().unwrap().len(), 3);
        assert!(web.content.opening_hook.is_some());
    }
}
