//! # Link Key-Type Manager
//!
//! A link is a physical connection between two switch ports, keyed by
//! `(controller_name, switch_id1, port_id1, switch_id2, port_id2)`. The
//! manager validates requests, drives the store for CRUD and bulk reads, and
//! derives the link's two-state oper status (up / unknown) from a single
//! read of the parent controller row.
//!
//! Sibling reads tolerate a partial key: the trailing four key components
//! are optional, and the pagination layer loosens the predicate between
//! attempts per [`LINK_SIBLING_HIERARCHY`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::db::{read_siblings, Connection, KeyHierarchy, Store};
use crate::kt::{OpError, OpResult, ValidationError};
use crate::schema::{
    fill_attr, fill_attr_decided, fill_attr_text, ColumnName, Operation, Row,
    TableKind, TableSchema, ValidFlag,
};
use crate::value::{AttrType, AttrValue};

/// Key components allowed in identifiers (switch ids may carry datapath
/// notation such as `openflow:1`).
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.:-]+$").expect("identifier pattern"));

/// Declared sibling-read hierarchy: controller and first switch are
/// mandatory, the trailing four components are optional and popped from the
/// back.
pub const LINK_SIBLING_HIERARCHY: KeyHierarchy = KeyHierarchy {
    columns: &[
        ColumnName::CtrName,
        ColumnName::SwitchId1,
        ColumnName::PortId1,
        ColumnName::SwitchId2,
        ColumnName::PortId2,
    ],
    min_required: 2,
};

/// Controller oper-status value meaning "up".
pub const CONTROLLER_OPER_UP: u16 = 1;

/// Two-state link oper status plus the persisted "down" value.
///
/// Propagation only ever writes `Up` or `Unknown`; `Down` exists because the
/// southbound driver may have recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOperStatus {
    Down,
    Up,
    Unknown,
}

impl LinkOperStatus {
    pub fn as_u16(self) -> u16 {
        match self {
            LinkOperStatus::Down => 0,
            LinkOperStatus::Up => 1,
            LinkOperStatus::Unknown => 2,
        }
    }

    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(LinkOperStatus::Down),
            1 => Some(LinkOperStatus::Up),
            2 => Some(LinkOperStatus::Unknown),
            _ => None,
        }
    }
}

/// Full composite key of one link row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkKey {
    pub controller_name: String,
    pub switch_id1: String,
    pub port_id1: String,
    pub switch_id2: String,
    pub port_id2: String,
}

impl LinkKey {
    fn fields(&self) -> [(&'static str, &str, usize, ColumnName); 5] {
        [
            ("controller_name", &self.controller_name, 32, ColumnName::CtrName),
            ("switch_id1", &self.switch_id1, 256, ColumnName::SwitchId1),
            ("port_id1", &self.port_id1, 32, ColumnName::PortId1),
            ("switch_id2", &self.switch_id2, 256, ColumnName::SwitchId2),
            ("port_id2", &self.port_id2, 32, ColumnName::PortId2),
        ]
    }
}

/// Caller-supplied link attributes with per-column validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub description: String,
    pub oper_status: LinkOperStatus,
    pub description_valid: ValidFlag,
    pub oper_status_valid: ValidFlag,
}

impl LinkSpec {
    /// A spec as if the value struct was never supplied.
    pub fn not_given() -> Self {
        LinkSpec {
            description: String::new(),
            oper_status: LinkOperStatus::Unknown,
            description_valid: ValidFlag::NotGiven,
            oper_status_valid: ValidFlag::NotGiven,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self.description_valid = ValidFlag::Valid;
        self
    }

    pub fn with_oper_status(mut self, status: LinkOperStatus) -> Self {
        self.oper_status = status;
        self.oper_status_valid = ValidFlag::Valid;
        self
    }

    /// Mark the description for an explicit clear on update.
    pub fn clear_description(mut self) -> Self {
        self.description.clear();
        self.description_valid = ValidFlag::NoValue;
        self
    }

    pub fn clear_oper_status(mut self) -> Self {
        self.oper_status_valid = ValidFlag::NoValue;
        self
    }
}

impl Default for LinkSpec {
    fn default() -> Self {
        LinkSpec::not_given()
    }
}

/// One link row read back out of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub key: LinkKey,
    pub description: String,
    pub oper_status: LinkOperStatus,
    pub description_valid: ValidFlag,
    pub oper_status_valid: ValidFlag,
}

impl LinkRecord {
    fn from_row(row: &Row) -> OpResult<Self> {
        let key = LinkKey {
            controller_name: text_col(row, ColumnName::CtrName)?,
            switch_id1: text_col(row, ColumnName::SwitchId1)?,
            port_id1: text_col(row, ColumnName::PortId1)?,
            switch_id2: text_col(row, ColumnName::SwitchId2)?,
            port_id2: text_col(row, ColumnName::PortId2)?,
        };
        let status_raw = u16_col(row, ColumnName::OperStatus)?;
        let oper_status = LinkOperStatus::from_u16(status_raw)
            .ok_or_else(|| OpError::General(format!("stored oper_status {status_raw} out of range")))?;
        let flags = text_col(row, ColumnName::Valid)?;
        let mut chars = flags.chars();
        let description_valid = chars.next().map_or(ValidFlag::Invalid, ValidFlag::from_char);
        let oper_status_valid = chars.next().map_or(ValidFlag::Invalid, ValidFlag::from_char);
        Ok(LinkRecord {
            key,
            description: text_col(row, ColumnName::Description)?,
            oper_status,
            description_valid,
            oper_status_valid,
        })
    }
}

fn text_col(row: &Row, name: ColumnName) -> OpResult<String> {
    match row.iter().find(|a| a.name == name).and_then(|a| a.value.as_ref()) {
        Some(AttrValue::Bytes(b)) => Ok(b.as_text()),
        Some(other) => Err(OpError::General(format!("column {name} is not text: {other:?}"))),
        None => Err(OpError::General(format!("fetched row is missing column {name}"))),
    }
}

fn u16_col(row: &Row, name: ColumnName) -> OpResult<u16> {
    match row.iter().find(|a| a.name == name).and_then(|a| a.value.as_ref()) {
        Some(AttrValue::Uint16(v)) => Ok(*v),
        Some(other) => Err(OpError::General(format!("column {name} is not uint16: {other:?}"))),
        None => Err(OpError::General(format!("fetched row is missing column {name}"))),
    }
}

/// Partial key for sibling reads: the two leading components are mandatory,
/// the trailing three optional (and contiguous).
#[derive(Debug, Clone, Default)]
pub struct LinkSiblingFilter {
    pub controller_name: String,
    pub switch_id1: String,
    pub port_id1: Option<String>,
    pub switch_id2: Option<String>,
    pub port_id2: Option<String>,
}

/// Manager for the link key type.
#[derive(Debug)]
pub struct LinkManager<C: Connection> {
    store: Store<C>,
    max_rep_ct: u32,
}

impl<C: Connection> LinkManager<C> {
    /// `max_rep_ct` caps every bulk read (one batch of sibling rows).
    pub fn new(store: Store<C>, max_rep_ct: u32) -> Self {
        LinkManager { store, max_rep_ct }
    }

    pub fn store_mut(&mut self) -> &mut Store<C> {
        &mut self.store
    }

    /// Create one link row. The parent controller must exist; an existing
    /// link with the same key is `InstanceExists`.
    pub fn create(&mut self, key: &LinkKey, spec: &LinkSpec) -> OpResult<()> {
        validate_key(key)?;
        validate_spec(spec)?;

        if !self.controller_exists(&key.controller_name)? {
            warn!(controller = %key.controller_name, "link create for unknown controller");
            return Err(OpError::NoSuchInstance);
        }
        let mut probe = key_schema(key)?;
        if self.store.is_row_exists(&mut probe)? {
            return Err(OpError::InstanceExists);
        }

        let mut schema = value_schema(key, spec, Operation::Create, None)?;
        self.store.create_row(&mut schema)?;
        info!(controller = %key.controller_name, switch1 = %key.switch_id1, "link created");
        Ok(())
    }

    /// Update the link's value columns per the supplied valid flags. Columns
    /// the caller did not touch keep their stored content and validity.
    pub fn update(&mut self, key: &LinkKey, spec: &LinkSpec) -> OpResult<()> {
        validate_key(key)?;
        validate_spec(spec)?;

        let prior = self.read(key)?;
        let mut schema = value_schema(key, spec, Operation::Update, Some(&prior))?;
        self.store.update_row(&mut schema)?;
        debug!(controller = %key.controller_name, "link updated");
        Ok(())
    }

    pub fn delete(&mut self, key: &LinkKey) -> OpResult<()> {
        validate_key(key)?;
        let mut schema = key_schema(key)?;
        self.store.delete_row(&mut schema)?;
        info!(controller = %key.controller_name, switch1 = %key.switch_id1, "link deleted");
        Ok(())
    }

    /// Read one link by full key.
    pub fn read(&mut self, key: &LinkKey) -> OpResult<LinkRecord> {
        validate_key(key)?;
        let mut schema = key_schema(key)?;
        self.store.get_one_row(&mut schema)?;
        let row = schema
            .rows()
            .first()
            .ok_or_else(|| OpError::General("fetch produced no row".into()))?;
        LinkRecord::from_row(row)
    }

    /// Existence check by full key.
    pub fn exists(&mut self, key: &LinkKey) -> OpResult<bool> {
        validate_key(key)?;
        let mut schema = key_schema(key)?;
        Ok(self.store.is_row_exists(&mut schema)?)
    }

    /// Sibling read with a partial key, via the bounded loosen-and-retry
    /// policy. Returns at most `min(max_rows, max_rep_ct)` records.
    pub fn read_bulk(&mut self, filter: &LinkSiblingFilter, max_rows: u32) -> OpResult<Vec<LinkRecord>> {
        let mut schema = sibling_schema(filter)?;
        let cap = max_rows.min(self.max_rep_ct).max(1);
        read_siblings(&mut self.store, &mut schema, &LINK_SIBLING_HIERARCHY, cap)?;
        schema.rows()[1..].iter().map(LinkRecord::from_row).collect()
    }

    /// Recompute oper status for every link of a controller from one read
    /// of the parent controller row, and persist it.
    ///
    /// Processes at most one `max_rep_ct` batch per invocation.
    pub fn handle_oper_status(&mut self, controller_name: &str) -> OpResult<LinkOperStatus> {
        check_identifier("controller_name", controller_name, 32)?;

        let ctr_status = self.controller_oper_status(controller_name)?;
        let new_status = if ctr_status == CONTROLLER_OPER_UP {
            LinkOperStatus::Up
        } else {
            LinkOperStatus::Unknown
        };
        debug!(controller = controller_name, ?new_status, "propagating link oper status");

        let mut schema = TableSchema::new(TableKind::Link);
        schema.set_primary_keys(vec![ColumnName::CtrName, ColumnName::SwitchId1]);
        let mut seed = Row::new();
        fill_attr_text(&mut seed, ColumnName::CtrName, AttrType::Bytes(32), controller_name)?;
        fill_attr_text(&mut seed, ColumnName::SwitchId1, AttrType::Bytes(256), "")?;
        schema.push_row(seed);

        let fetched = match self.store.get_bulk_rows(&mut schema, self.max_rep_ct) {
            Ok(n) => n,
            // No links for this controller is not an error here.
            Err(crate::db::DbError::RecordNotFound) => 0,
            Err(e) => return Err(e.into()),
        };
        if fetched == self.max_rep_ct {
            warn!(controller = controller_name, batch = fetched, "oper-status batch cap reached");
        }

        let records: Vec<LinkRecord> = schema.rows()[1..]
            .iter()
            .map(LinkRecord::from_row)
            .collect::<OpResult<_>>()?;
        for record in &records {
            self.set_oper_status(&record.key, new_status)?;
        }
        info!(controller = controller_name, links = records.len(), status = ?new_status, "oper status propagated");
        Ok(new_status)
    }

    /// Persist one link's oper status.
    pub fn set_oper_status(&mut self, key: &LinkKey, status: LinkOperStatus) -> OpResult<()> {
        validate_key(key)?;
        let mut schema = key_schema(key)?;
        let row = &mut schema.rows_mut()[0];
        fill_attr_text(row, ColumnName::OperStatus, AttrType::Uint16, &status.as_u16().to_string())?;
        self.store.update_row(&mut schema)?;
        Ok(())
    }

    fn controller_exists(&mut self, controller_name: &str) -> OpResult<bool> {
        let mut schema = controller_schema(controller_name)?;
        Ok(self.store.is_row_exists(&mut schema)?)
    }

    fn controller_oper_status(&mut self, controller_name: &str) -> OpResult<u16> {
        let mut schema = controller_schema(controller_name)?;
        self.store.get_one_row(&mut schema)?;
        let row = schema
            .rows()
            .first()
            .ok_or_else(|| OpError::General("controller fetch produced no row".into()))?;
        u16_col(row, ColumnName::OperStatus)
    }
}

fn check_identifier(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingKey(field));
    }
    if value.len() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if !IDENT_RE.is_match(value) {
        return Err(ValidationError::BadIdentifier { field });
    }
    Ok(())
}

fn validate_key(key: &LinkKey) -> Result<(), ValidationError> {
    for (field, value, max, _) in key.fields() {
        check_identifier(field, value, max)?;
    }
    Ok(())
}

fn validate_spec(spec: &LinkSpec) -> Result<(), ValidationError> {
    if spec.description_valid == ValidFlag::Valid && spec.description.len() > 128 {
        return Err(ValidationError::TooLong { field: "description", max: 128 });
    }
    Ok(())
}

fn key_row(key: &LinkKey) -> OpResult<Row> {
    let mut row = Row::new();
    for (_, value, max, column) in key.fields() {
        fill_attr_text(&mut row, column, AttrType::Bytes(max), value)?;
    }
    Ok(row)
}

fn key_schema(key: &LinkKey) -> OpResult<TableSchema> {
    let mut schema = TableSchema::new(TableKind::Link);
    schema.set_primary_keys(LINK_SIBLING_HIERARCHY.columns.to_vec());
    schema.push_row(key_row(key)?);
    Ok(schema)
}

fn controller_schema(controller_name: &str) -> OpResult<TableSchema> {
    let mut schema = TableSchema::new(TableKind::Controller);
    schema.set_primary_keys(vec![ColumnName::CtrName]);
    let mut row = Row::new();
    fill_attr_text(&mut row, ColumnName::CtrName, AttrType::Bytes(32), controller_name)?;
    schema.push_row(row);
    Ok(schema)
}

/// Build the write schema for create/update: key columns, decided value
/// columns, and the serialized valid flags.
fn value_schema(
    key: &LinkKey,
    spec: &LinkSpec,
    op: Operation,
    prior: Option<&LinkRecord>,
) -> OpResult<TableSchema> {
    let mut schema = TableSchema::new(TableKind::Link);
    schema.set_primary_keys(LINK_SIBLING_HIERARCHY.columns.to_vec());
    let mut row = key_row(key)?;

    let prior_desc = prior.map_or(ValidFlag::Invalid, |p| p.description_valid);
    let prior_status = prior.map_or(ValidFlag::Invalid, |p| p.oper_status_valid);

    // The description column is the documented clear exception: it stays
    // valid when explicitly cleared.
    let desc_flag = fill_attr_decided(
        &mut row,
        None,
        ColumnName::Description,
        AttrType::Bytes(128),
        &spec.description,
        op,
        spec.description_valid,
        prior_desc,
        true,
    )?;
    let status_flag = fill_attr_decided(
        &mut row,
        None,
        ColumnName::OperStatus,
        AttrType::Uint16,
        &spec.oper_status.as_u16().to_string(),
        op,
        spec.oper_status_valid,
        prior_status,
        false,
    )?;

    let flags = [desc_flag.as_char() as u8, status_flag.as_char() as u8];
    fill_attr(&mut row, ColumnName::Valid, AttrType::Bytes(2), &flags)?;

    schema.push_row(row);
    Ok(schema)
}

fn sibling_schema(filter: &LinkSiblingFilter) -> OpResult<TableSchema> {
    check_identifier("controller_name", &filter.controller_name, 32)?;
    check_identifier("switch_id1", &filter.switch_id1, 256)?;

    // Optional trailing components must be contiguous.
    let tail = [
        ("port_id1", &filter.port_id1, 32usize, ColumnName::PortId1),
        ("switch_id2", &filter.switch_id2, 256, ColumnName::SwitchId2),
        ("port_id2", &filter.port_id2, 32, ColumnName::PortId2),
    ];
    let mut gap = false;
    for (field, value, _, _) in &tail {
        match value {
            Some(_) if gap => return Err(ValidationError::MissingKey(field).into()),
            Some(_) => {}
            None => gap = true,
        }
    }

    let mut schema = TableSchema::new(TableKind::Link);
    let mut row = Row::new();
    fill_attr_text(&mut row, ColumnName::CtrName, AttrType::Bytes(32), &filter.controller_name)?;
    fill_attr_text(&mut row, ColumnName::SwitchId1, AttrType::Bytes(256), &filter.switch_id1)?;
    let mut keys = vec![ColumnName::CtrName, ColumnName::SwitchId1];
    for (field, value, max, column) in tail {
        if let Some(v) = &value {
            check_identifier(field, v, max)?;
            fill_attr_text(&mut row, column, AttrType::Bytes(max), v)?;
            keys.push(column);
        }
    }
    schema.set_primary_keys(keys);
    schema.push_row(row);
    Ok(schema)
}
