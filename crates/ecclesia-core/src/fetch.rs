//! Entity fetchers: one per hierarchy level and one per parish sub-resource.
//!
//! Every fetcher takes the parent identifier as an `Option`. An absent parent
//! yields an empty list rather than an error, as does a parent without
//! children. Errors are returned as-is; applying them to the displayed state
//! (notify, keep the last good data) is the job of
//! [`QueryCache`](crate::query::QueryCache).

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
  Error, Result,
  activity::PastoralActivity,
  asset::Asset,
  census::CensusRecord,
  member::Member,
  org::{Community, District, DistrictTree, Parish, Region, RegionTree},
  query::QueryKey,
  record::Record,
  store::DataService,
  table::{Query, Row, Table},
  worship::ReligiousService,
};

// ─── Generic ─────────────────────────────────────────────────────────────────

/// Rows of `R::TABLE` matching `query`, decoded.
pub async fn fetch_where<S, R>(svc: &S, query: &Query) -> Result<Vec<R>>
where
  S: DataService,
  R: Record,
{
  tracing::debug!(table = %R::TABLE, ?query, "select");
  svc
    .select(R::TABLE, query)
    .await
    .map_err(Error::service)?
    .into_iter()
    .map(R::from_row)
    .collect()
}

/// Children of `parent`, shaped by `refine` (ordering, lineage). Top-level
/// tables ignore `parent` and return every row.
async fn children<S, R>(
  svc: &S,
  parent: Option<Uuid>,
  refine: impl FnOnce(Query) -> Query,
) -> Result<Vec<R>>
where
  S: DataService,
  R: Record,
{
  let query = match (R::TABLE.parent_column(), parent) {
    (Some(_), None) => return Ok(Vec::new()),
    (Some(_), Some(id)) => Query::children_of(R::TABLE, id),
    (None, _) => Query::all(),
  };
  fetch_where(svc, &refine(query)).await
}

/// Children of `parent` in insertion order.
pub async fn fetch_children<S, R>(svc: &S, parent: Option<Uuid>) -> Result<Vec<R>>
where
  S: DataService,
  R: Record,
{
  children(svc, parent, |q| q).await
}

/// The row with primary key `id`, if any.
pub async fn fetch_one<S, R>(svc: &S, id: Uuid) -> Result<Option<R>>
where
  S: DataService,
  R: Record,
{
  Ok(fetch_where(svc, &Query::by_id(id)).await?.into_iter().next())
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

pub async fn fetch_regions<S: DataService>(svc: &S) -> Result<Vec<Region>> {
  fetch_where(svc, &Query::all().order_by("name")).await
}

/// Districts of a region, each joined with its region's name.
pub async fn fetch_districts<S: DataService>(
  svc: &S,
  region_id: Option<Uuid>,
) -> Result<Vec<District>> {
  children(svc, region_id, |q| q.with_lineage().order_by("name")).await
}

/// Parishes of a district, each joined with its district and region names.
pub async fn fetch_parishes<S: DataService>(
  svc: &S,
  district_id: Option<Uuid>,
) -> Result<Vec<Parish>> {
  children(svc, district_id, |q| q.with_lineage().order_by("name")).await
}

/// Every district with lineage; for selectors and the directory.
pub async fn fetch_all_districts<S: DataService>(svc: &S) -> Result<Vec<District>> {
  fetch_where(svc, &Query::all().with_lineage().order_by("name")).await
}

/// Every parish with lineage; for selectors and the directory.
pub async fn fetch_all_parishes<S: DataService>(svc: &S) -> Result<Vec<Parish>> {
  fetch_where(svc, &Query::all().with_lineage().order_by("name")).await
}

/// One parish with lineage, for its overview header.
pub async fn fetch_parish<S: DataService>(svc: &S, id: Uuid) -> Result<Option<Parish>> {
  let query = Query::by_id(id).with_lineage();
  Ok(fetch_where(svc, &query).await?.into_iter().next())
}

// ─── Parish sub-resources ────────────────────────────────────────────────────

pub async fn fetch_members<S: DataService>(
  svc: &S,
  parish_id: Option<Uuid>,
) -> Result<Vec<Member>> {
  children(svc, parish_id, |q| q.order_by("last_name")).await
}

/// Census records in the order the service returned them. The order is
/// significant: it breaks ties between same-day records.
pub async fn fetch_census<S: DataService>(
  svc: &S,
  parish_id: Option<Uuid>,
) -> Result<Vec<CensusRecord>> {
  fetch_children(svc, parish_id).await
}

pub async fn fetch_assets<S: DataService>(
  svc: &S,
  parish_id: Option<Uuid>,
) -> Result<Vec<Asset>> {
  children(svc, parish_id, |q| q.order_by("designation")).await
}

pub async fn fetch_services<S: DataService>(
  svc: &S,
  parish_id: Option<Uuid>,
) -> Result<Vec<ReligiousService>> {
  children(svc, parish_id, |q| q.order_by("date")).await
}

pub async fn fetch_activities<S: DataService>(
  svc: &S,
  parish_id: Option<Uuid>,
) -> Result<Vec<PastoralActivity>> {
  children(svc, parish_id, |q| q.order_by("date")).await
}

pub async fn fetch_communities<S: DataService>(
  svc: &S,
  parish_id: Option<Uuid>,
) -> Result<Vec<Community>> {
  children(svc, parish_id, |q| q.order_by("name")).await
}

// ─── Trees ───────────────────────────────────────────────────────────────────

fn decode_tree<T: DeserializeOwned>(table: Table, row: Row) -> Result<T> {
  serde_json::from_value(serde_json::Value::Object(row))
    .map_err(|source| Error::Decode { table, source })
}

/// A region with districts, parishes and per-parish member counts.
pub async fn fetch_region_tree<S: DataService>(
  svc: &S,
  region_id: Uuid,
) -> Result<Option<RegionTree>> {
  tracing::debug!(%region_id, "region tree");
  svc
    .region_tree(region_id)
    .await
    .map_err(Error::service)?
    .map(|row| decode_tree(Table::Regions, row))
    .transpose()
}

/// A district with its region's name, parishes and member counts.
pub async fn fetch_district_tree<S: DataService>(
  svc: &S,
  district_id: Uuid,
) -> Result<Option<DistrictTree>> {
  tracing::debug!(%district_id, "district tree");
  svc
    .district_tree(district_id)
    .await
    .map_err(Error::service)?
    .map(|row| decode_tree(Table::Districts, row))
    .transpose()
}

// ─── Keyed dispatch ──────────────────────────────────────────────────────────

/// The typed result of fetching one [`QueryKey`].
#[derive(Debug, Clone)]
pub enum Fetched {
  Regions(Vec<Region>),
  Districts(Vec<District>),
  Parishes(Vec<Parish>),
  Parish(Option<Parish>),
  Members(Vec<Member>),
  Census(Vec<CensusRecord>),
  Assets(Vec<Asset>),
  Services(Vec<ReligiousService>),
  Activities(Vec<PastoralActivity>),
  Communities(Vec<Community>),
  RegionTree(Option<RegionTree>),
  DistrictTree(Option<DistrictTree>),
}

/// Run the fetcher responsible for `key`.
pub async fn fetch_key<S: DataService>(svc: &S, key: QueryKey) -> Result<Fetched> {
  Ok(match key {
    QueryKey::Regions => Fetched::Regions(fetch_regions(svc).await?),
    QueryKey::AllDistricts => Fetched::Districts(fetch_all_districts(svc).await?),
    QueryKey::AllParishes => Fetched::Parishes(fetch_all_parishes(svc).await?),
    QueryKey::Parish(id) => Fetched::Parish(fetch_parish(svc, id).await?),
    QueryKey::RegionTree(id) => Fetched::RegionTree(fetch_region_tree(svc, id).await?),
    QueryKey::DistrictTree(id) => {
      Fetched::DistrictTree(fetch_district_tree(svc, id).await?)
    }
    QueryKey::Children { table, parent } => {
      let parent = Some(parent);
      match table {
        Table::Regions => Fetched::Regions(fetch_regions(svc).await?),
        Table::Districts => Fetched::Districts(fetch_districts(svc, parent).await?),
        Table::Parishes => Fetched::Parishes(fetch_parishes(svc, parent).await?),
        Table::Members => Fetched::Members(fetch_members(svc, parent).await?),
        Table::CensusRecords => Fetched::Census(fetch_census(svc, parent).await?),
        Table::Assets => Fetched::Assets(fetch_assets(svc, parent).await?),
        Table::Services => Fetched::Services(fetch_services(svc, parent).await?),
        Table::Activities => Fetched::Activities(fetch_activities(svc, parent).await?),
        Table::Communities => {
          Fetched::Communities(fetch_communities(svc, parent).await?)
        }
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fake::{MemoryService, seed};

  #[tokio::test]
  async fn absent_parent_yields_empty_list() {
    let svc = MemoryService::default();
    assert!(fetch_members(&svc, None).await.unwrap().is_empty());
    assert!(fetch_districts(&svc, None).await.unwrap().is_empty());
    assert_eq!(svc.calls(), 0, "no request should be sent without a parent");
  }

  #[tokio::test]
  async fn parent_without_children_yields_empty_list() {
    let svc = MemoryService::default();
    let tree = seed::hierarchy(&svc).await;
    let empty = fetch_members(&svc, Some(tree.empty_parish)).await.unwrap();
    assert!(empty.is_empty());
  }

  #[tokio::test]
  async fn parishes_carry_lineage_names() {
    let svc = MemoryService::default();
    let tree = seed::hierarchy(&svc).await;
    let parishes = fetch_parishes(&svc, Some(tree.district)).await.unwrap();
    assert_eq!(parishes.len(), 2);
    assert!(parishes.iter().all(|p| p.region_name.as_deref() == Some("Abidjan")));
    assert!(parishes.iter().all(|p| p.district_name.as_deref() == Some("Cocody")));
    assert_eq!(parishes[0].breadcrumb(), "Abidjan › Cocody › Bethel");
  }

  #[tokio::test]
  async fn transport_failure_is_an_error() {
    let svc = MemoryService::default();
    let tree = seed::hierarchy(&svc).await;
    svc.fail_next("connection reset");
    let err = fetch_members(&svc, Some(tree.parish)).await.unwrap_err();
    assert!(matches!(err, Error::Service(_)));
  }

  #[tokio::test]
  async fn region_tree_decodes_nested_counts() {
    let svc = MemoryService::default();
    let tree = seed::hierarchy(&svc).await;
    let fetched = fetch_region_tree(&svc, tree.region).await.unwrap().unwrap();
    let districts = fetched.districts.unwrap();
    assert_eq!(districts.len(), 2);
    let cocody = districts.iter().find(|d| d.district.name == "Cocody").unwrap();
    let counts: Vec<_> = cocody
      .parishes
      .as_ref()
      .unwrap()
      .iter()
      .map(|p| (p.parish.name.as_str(), p.member_count))
      .collect();
    assert_eq!(counts, vec![("Bethel", Some(3)), ("Siloé", Some(0))]);
  }

  #[tokio::test]
  async fn sibling_districts_do_not_share_parishes_or_members() {
    let svc = MemoryService::default();
    let tree = seed::hierarchy(&svc).await;

    let cocody = fetch_district_tree(&svc, tree.district).await.unwrap().unwrap();
    let names: Vec<_> = cocody
      .parishes
      .as_ref()
      .unwrap()
      .iter()
      .map(|p| p.parish.name.as_str())
      .collect();
    assert!(!names.contains(&"Emmaüs"), "{names:?}");
    assert_eq!(crate::aggregate::district_member_count(&cocody), 3);

    let yopougon = fetch_district_tree(&svc, tree.other_district).await.unwrap().unwrap();
    let parishes = yopougon.parishes.as_ref().unwrap();
    assert_eq!(parishes.len(), 1);
    assert_eq!(parishes[0].parish.id, tree.other_parish);
    assert_eq!(crate::aggregate::district_member_count(&yopougon), 1);

    let members = fetch_members(&svc, Some(tree.other_parish)).await.unwrap();
    let names: Vec<_> = members.iter().map(|m| m.last_name.as_str()).collect();
    assert_eq!(names, ["Gnagne"]);
  }

  #[tokio::test]
  async fn missing_tree_is_none() {
    let svc = MemoryService::default();
    assert!(fetch_region_tree(&svc, Uuid::new_v4()).await.unwrap().is_none());
  }
}
