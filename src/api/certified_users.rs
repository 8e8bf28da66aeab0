// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    models::{CertifiedUserView, CertifiedUsersResponse},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against aliases.
    pub q: Option<String>,
}

fn into_response(users: Vec<crate::models::CertifiedUser>) -> Json<CertifiedUsersResponse> {
    Json(CertifiedUsersResponse {
        success: true,
        users: users.into_iter().map(CertifiedUserView::from).collect(),
    })
}

/// All certified users, most recently certified first.
#[utoipa::path(
    get,
    path = "/api/certified-users",
    tag = "Certification",
    responses((status = 200, body = CertifiedUsersResponse))
)]
pub async fn list_certified_users(
    State(state): State<AppState>,
) -> Result<Json<CertifiedUsersResponse>, ApiError> {
    Ok(into_response(state.store.list_all_certified_users()?))
}

#[utoipa::path(
    get,
    path = "/api/certified-users/search",
    params(SearchQuery),
    tag = "Certification",
    responses(
        (status = 200, body = CertifiedUsersResponse),
        (status = 400, description = "Query parameter missing")
    )
)]
pub async fn search_certified_users(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<CertifiedUsersResponse>, ApiError> {
    let Query(params) = params?;
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query parameter \"q\" is required"))?;

    Ok(into_response(state.store.search_by_alias(&query)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{TimeDelta, Utc};

    use crate::api::test_support::TestApp;
    use crate::models::CertifiedUser;

    fn seed(app: &TestApp, users: &[(&str, Option<&str>)]) {
        let base = Utc::now();
        for (i, (key, alias)) in users.iter().enumerate() {
            app.state
                .store
                .store_certification(&CertifiedUser {
                    identity_key: (*key).into(),
                    alias: alias.map(str::to_string),
                    certification_date: base + TimeDelta::seconds(i as i64),
                    certification_txid: format!("tx{i}"),
                    host: "https://relay.test".into(),
                })
                .unwrap();
        }
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let app = TestApp::new();
        seed(&app, &[("02a", Some("Anna")), ("02b", None), ("02c", Some("Joanne"))]);

        let Json(response) = list_certified_users(State(app.state.clone())).await.unwrap();

        let keys: Vec<_> = response.users.iter().map(|u| u.identity_key.as_str()).collect();
        assert_eq!(keys, ["02c", "02b", "02a"]);
        assert!(response.users[0].certification_date.ends_with('Z'));
    }

    #[tokio::test]
    async fn list_is_empty_without_certifications() {
        let app = TestApp::new();
        let Json(response) = list_certified_users(State(app.state.clone())).await.unwrap();
        assert!(response.success);
        assert!(response.users.is_empty());
    }

    #[tokio::test]
    async fn search_matches_alias_case_insensitively() {
        let app = TestApp::new();
        seed(&app, &[("02a", Some("Anna")), ("02b", None), ("02c", Some("Joanne"))]);

        let Json(response) = search_certified_users(
            State(app.state.clone()),
            Ok(Query(SearchQuery { q: Some("ANN".into()) })),
        )
        .await
        .unwrap();

        let aliases: Vec<_> = response
            .users
            .iter()
            .filter_map(|u| u.alias.as_deref())
            .collect();
        assert_eq!(aliases, ["Joanne", "Anna"]);
    }

    #[tokio::test]
    async fn search_requires_query() {
        let app = TestApp::new();

        for q in [None, Some(String::new())] {
            let err = search_certified_users(State(app.state.clone()), Ok(Query(SearchQuery { q })))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }
}
