//! Taxonomy resolver - looks up or creates categories and tags

use std::collections::HashMap;

use crate::content::TermSpec;
use crate::error::Result;
use crate::remote::{CmsApi, RemoteTerm, TermFields, Taxonomy};

/// Resolves category and tag specs to remote term ids, creating terms
/// that do not exist yet and reconciling description/metadata drift on
/// the ones that do.
pub struct TermResolver<'a> {
    api: &'a dyn CmsApi,
    resolved: HashMap<(Taxonomy, String), i64>,
}

impl<'a> TermResolver<'a> {
    pub fn new(api: &'a dyn CmsApi) -> Self {
        Self {
            api,
            resolved: HashMap::new(),
        }
    }

    /// Resolve one term spec to its remote id.
    ///
    /// The term search is a substring search, so candidates are filtered
    /// by case-insensitive exact name equality before anything counts as
    /// a match; "Go" never resolves to an existing "Golang".
    pub async fn resolve_term(&mut self, spec: &TermSpec, taxonomy: Taxonomy) -> Result<i64> {
        let name = spec.name().trim();
        let cache_key = (taxonomy, name.to_lowercase());
        if let Some(&id) = self.resolved.get(&cache_key) {
            return Ok(id);
        }

        tracing::info!("Ensuring {} exists: {:?}", taxonomy, name);
        let desired = fields_for(spec, taxonomy);

        let candidates = self.api.search_terms(taxonomy, name).await?;
        let existing = candidates
            .into_iter()
            .find(|t| t.name.to_lowercase() == name.to_lowercase());

        let id = match existing {
            Some(term) => {
                if needs_update(&term, &desired) {
                    tracing::info!("Updating {} {:?} [{}]", taxonomy, name, term.id);
                    self.api.update_term(taxonomy, term.id, &desired).await?;
                } else {
                    tracing::debug!("{} {:?} is up to date [{}]", taxonomy, name, term.id);
                }
                term.id
            }
            None => {
                let created = self.api.create_term(taxonomy, &desired).await?.into_inner();
                created.id
            }
        };

        self.resolved.insert(cache_key, id);
        Ok(id)
    }
}

/// Normalize a spec into the field set sent over the wire
fn fields_for(spec: &TermSpec, taxonomy: Taxonomy) -> TermFields {
    let presentation = match taxonomy {
        Taxonomy::Category => spec.icon(),
        Taxonomy::Tag => spec.color(),
    };
    TermFields {
        name: spec.name().trim().to_string(),
        description: spec.description().to_string(),
        meta: presentation
            .map(|value| serde_json::json!({ (taxonomy.meta_key()): value })),
    }
}

/// A remote write is only worth issuing when something actually differs.
/// Terms may lack optional fields entirely; absence reads as empty.
fn needs_update(term: &RemoteTerm, desired: &TermFields) -> bool {
    if !desired.description.is_empty() && term.description != desired.description {
        return true;
    }
    if let Some(meta) = &desired.meta {
        if let Some(obj) = meta.as_object() {
            for (key, value) in obj {
                if term.meta.get(key) != Some(value) {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::api::MockCmsApi;
    use crate::remote::Applied;

    fn term(id: i64, name: &str, description: &str) -> RemoteTerm {
        RemoteTerm {
            id,
            name: name.to_string(),
            description: description.to_string(),
            meta: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_exact_match_not_substring() {
        // the search endpoint returns "Golang" for a "Go" query; that
        // candidate must be rejected and a new term created
        let mut api = MockCmsApi::new();
        api.expect_search_terms()
            .returning(|_, _| Ok(vec![term(5, "Golang", "")]));
        api.expect_create_term()
            .withf(|tax, fields| *tax == Taxonomy::Tag && fields.name == "Go")
            .times(1)
            .returning(|_, fields| {
                Ok(Applied::Committed(RemoteTerm {
                    id: 9,
                    name: fields.name.clone(),
                    ..Default::default()
                }))
            });

        let mut resolver = TermResolver::new(&api);
        let id = resolver
            .resolve_term(&TermSpec::Name("Go".to_string()), Taxonomy::Tag)
            .await
            .unwrap();
        assert_eq!(id, 9);
    }

    #[tokio::test]
    async fn test_case_insensitive_match_reuses_term() {
        let mut api = MockCmsApi::new();
        api.expect_search_terms()
            .returning(|_, _| Ok(vec![term(7, "Tech", "")]));
        api.expect_create_term().times(0);
        api.expect_update_term().times(0);

        let mut resolver = TermResolver::new(&api);
        let id = resolver
            .resolve_term(&TermSpec::Name("tech".to_string()), Taxonomy::Category)
            .await
            .unwrap();
        assert_eq!(id, 7);
    }

    #[tokio::test]
    async fn test_description_drift_triggers_update() {
        let mut api = MockCmsApi::new();
        api.expect_search_terms()
            .returning(|_, _| Ok(vec![term(7, "Tech", "old words")]));
        api.expect_update_term()
            .withf(|_, id, fields| *id == 7 && fields.description == "new words")
            .times(1)
            .returning(|_, id, fields| {
                Ok(Applied::Committed(RemoteTerm {
                    id,
                    name: fields.name.clone(),
                    description: fields.description.clone(),
                    meta: HashMap::new(),
                }))
            });

        let spec = TermSpec::Detailed {
            name: "Tech".to_string(),
            description: Some("new words".to_string()),
            icon: None,
            color: None,
        };
        let mut resolver = TermResolver::new(&api);
        let id = resolver
            .resolve_term(&spec, Taxonomy::Category)
            .await
            .unwrap();
        assert_eq!(id, 7);
    }

    #[tokio::test]
    async fn test_matching_state_issues_no_write() {
        let mut api = MockCmsApi::new();
        api.expect_search_terms()
            .returning(|_, _| Ok(vec![term(7, "Tech", "same words")]));
        api.expect_update_term().times(0);

        let spec = TermSpec::Detailed {
            name: "Tech".to_string(),
            description: Some("same words".to_string()),
            icon: None,
            color: None,
        };
        let mut resolver = TermResolver::new(&api);
        resolver
            .resolve_term(&spec, Taxonomy::Category)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_icon_goes_into_category_meta() {
        let mut api = MockCmsApi::new();
        api.expect_search_terms().returning(|_, _| Ok(vec![]));
        api.expect_create_term()
            .withf(|_, fields| {
                fields.meta.as_ref().and_then(|m| m.get("category_icon"))
                    == Some(&serde_json::json!("cpu"))
            })
            .times(1)
            .returning(|_, fields| {
                Ok(Applied::Committed(RemoteTerm {
                    id: 3,
                    name: fields.name.clone(),
                    ..Default::default()
                }))
            });

        let spec = TermSpec::Detailed {
            name: "Tech".to_string(),
            description: None,
            icon: Some("cpu".to_string()),
            color: None,
        };
        TermResolver::new(&api)
            .resolve_term(&spec, Taxonomy::Category)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_icon_drift_triggers_update() {
        let mut api = MockCmsApi::new();
        let mut existing = term(7, "Tech", "");
        existing
            .meta
            .insert("category_icon".to_string(), serde_json::json!("gear"));
        api.expect_search_terms()
            .returning(move |_, _| Ok(vec![existing.clone()]));
        api.expect_update_term()
            .times(1)
            .returning(|_, id, fields| {
                Ok(Applied::Committed(RemoteTerm {
                    id,
                    name: fields.name.clone(),
                    ..Default::default()
                }))
            });

        let spec = TermSpec::Detailed {
            name: "Tech".to_string(),
            description: None,
            icon: Some("cpu".to_string()),
            color: None,
        };
        TermResolver::new(&api)
            .resolve_term(&spec, Taxonomy::Category)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_repeated_resolution_hits_cache() {
        let mut api = MockCmsApi::new();
        api.expect_search_terms()
            .times(1)
            .returning(|_, _| Ok(vec![term(7, "Tech", "")]));

        let mut resolver = TermResolver::new(&api);
        let spec = TermSpec::Name("Tech".to_string());
        assert_eq!(
            resolver.resolve_term(&spec, Taxonomy::Category).await.unwrap(),
            7
        );
        assert_eq!(
            resolver.resolve_term(&spec, Taxonomy::Category).await.unwrap(),
            7
        );
    }
}
