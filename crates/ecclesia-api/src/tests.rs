use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use ecclesia_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn send(
  store: &Arc<SqliteStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(store.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();

  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn id_of(row: &Value) -> String { row["id"].as_str().unwrap().to_owned() }

/// Region → district → parish, returning the three ids.
async fn hierarchy(store: &Arc<SqliteStore>) -> (String, String, String) {
  let (_, region) = send(
    store,
    "POST",
    "/regions",
    Some(json!({ "name": "San-Pédro", "code": "REG-SANPE0", "superintendent": null })),
  )
  .await;
  let region = id_of(&region);

  let (_, district) = send(
    store,
    "POST",
    "/districts",
    Some(json!({ "name": "Tabou", "code": "", "region_id": region })),
  )
  .await;
  let district = id_of(&district);

  let (_, parish) = send(
    store,
    "POST",
    "/parishes",
    Some(json!({ "name": "Canaan", "code": "", "district_id": district })),
  )
  .await;
  (region, district, id_of(&parish))
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_generated_id() {
  let s = store().await;
  let (status, body) = send(
    &s,
    "POST",
    "/regions",
    Some(json!({ "name": "Korhogo", "code": "REG-KORHO4" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(id_of(&body).parse::<Uuid>().is_ok());
  assert_eq!(body["name"], "Korhogo");
}

#[tokio::test]
async fn blank_name_is_rejected_with_400() {
  let s = store().await;
  let (status, body) = send(&s, "POST", "/regions", Some(json!({ "name": "  ", "code": "" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("region name"));
}

#[tokio::test]
async fn unknown_table_is_404() {
  let s = store().await;
  let (status, _) = send(&s, "GET", "/sacraments", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_orders_and_joins_lineage() {
  let s = store().await;
  let (_, district, _) = hierarchy(&s).await;
  send(
    &s,
    "POST",
    "/parishes",
    Some(json!({ "name": "Béthel", "code": "", "district_id": district })),
  )
  .await;

  let uri = format!("/parishes?district_id={district}&order=name&lineage=true");
  let (status, body) = send(&s, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);

  let rows = body.as_array().unwrap();
  let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
  assert_eq!(names, vec!["Béthel", "Canaan"]);
  assert_eq!(rows[0]["district_name"], "Tabou");
  assert_eq!(rows[0]["region_name"], "San-Pédro");
}

#[tokio::test]
async fn filter_on_unknown_column_is_400() {
  let s = store().await;
  let (status, _) = send(&s, "GET", "/regions?colour=red", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&s, "GET", "/regions?lineage=maybe", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_one_and_missing_row() {
  let s = store().await;
  let (_, _, parish) = hierarchy(&s).await;

  let (status, body) = send(&s, "GET", &format!("/parishes/{parish}?lineage=true"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["district_name"], "Tabou");

  let (status, body) = send(&s, "GET", &format!("/parishes/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn patch_overwrites_named_columns() {
  let s = store().await;
  let (_, _, parish) = hierarchy(&s).await;
  let (status, body) = send(
    &s,
    "PATCH",
    &format!("/parishes/{parish}"),
    Some(json!({ "pastor": "Aka Samuel" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["pastor"], "Aka Samuel");
  assert_eq!(body["name"], "Canaan");

  let (status, _) = send(
    &s,
    "PATCH",
    &format!("/parishes/{}", Uuid::new_v4()),
    Some(json!({ "pastor": "Nobody" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patched_member_keeps_a_derived_role() {
  let s = store().await;
  let (_, _, parish) = hierarchy(&s).await;
  let (_, member) = send(
    &s,
    "POST",
    "/members",
    Some(json!({
      "parish_id": parish,
      "last_name": "Yao",
      "first_names": "Ruth",
      "membership_date": "2021-09-05",
      "ministries": ["Usher"],
    })),
  )
  .await;
  assert_eq!(member["role"], "Member");
  let uri = format!("/members/{}", id_of(&member));

  let (status, body) = send(&s, "PATCH", &uri, Some(json!({ "ministries": ["Elder"] }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["role"], "Elder");
  assert_eq!(body["last_name"], "Yao");

  let (status, _) = send(&s, "PATCH", &uri, Some(json!({ "role": "Bishop" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(&s, "PATCH", &uri, Some(json!({ "last_name": "" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let members = ecclesia_core::fetch::fetch_members(&*s, Some(parish.parse().unwrap()))
    .await
    .unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].role, ecclesia_core::member::MemberRole::Elder);
}

#[tokio::test]
async fn delete_with_children_conflicts_then_succeeds_bottom_up() {
  let s = store().await;
  let (region, district, parish) = hierarchy(&s).await;

  let (status, _) = send(&s, "DELETE", &format!("/regions/{region}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  for uri in [
    format!("/parishes/{parish}"),
    format!("/districts/{district}"),
    format!("/regions/{region}"),
  ] {
    let (status, _) = send(&s, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{uri}");
  }

  let (_, body) = send(&s, "GET", "/regions", None).await;
  assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn orphan_insert_conflicts() {
  let s = store().await;
  let (status, _) = send(
    &s,
    "POST",
    "/districts",
    Some(json!({ "name": "Nowhere", "code": "", "region_id": Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Trees ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn region_tree_nests_parishes_with_member_counts() {
  let s = store().await;
  let (region, _, parish) = hierarchy(&s).await;
  let (status, _) = send(
    &s,
    "POST",
    "/members",
    Some(json!({
      "parish_id": parish,
      "last_name": "Bamba",
      "first_names": "Awa",
      "membership_date": "2022-03-13",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, tree) = send(&s, "GET", &format!("/regions/{region}/tree"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tree["districts"][0]["name"], "Tabou");
  assert_eq!(tree["districts"][0]["parishes"][0]["member_count"], 1);
}

#[tokio::test]
async fn tree_of_leaf_table_or_missing_row_is_404() {
  let s = store().await;
  let (_, district, parish) = hierarchy(&s).await;

  let (status, tree) = send(&s, "GET", &format!("/districts/{district}/tree"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tree["region_name"], "San-Pédro");

  let (status, _) = send(&s, "GET", &format!("/parishes/{parish}/tree"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&s, "GET", &format!("/regions/{}/tree", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
