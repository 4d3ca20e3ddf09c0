//! Physical table catalog: the closed set of tables the controller persists,
//! with the declared type, order, and primary keys of every column.
//!
//! Column order in a [`TableDef`] is the statement column order; the bind and
//! fetch paths never invent columns the definition does not list.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::AttrType;

/// Identifier of one column within a table.
///
/// Names are unique per table, not globally: a shared identifier such as
/// `CtrName` appears in several tables and may carry a different declared
/// type in each (the [`TableDef`] is authoritative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnName {
    // Shared across tables
    CtrName,
    DomainName,
    Description,
    OperStatus,
    Valid,
    CsRowStatus,
    Type,
    IpAddress,
    Ipv6Address,
    SwitchId,
    PortId,

    // Controller table
    Version,
    UserName,
    Password,
    EnableAudit,
    ActualVersion,

    // Logical port table
    PortType,
    PhysicalPortId,
    OperDownCriteria,

    // Switch table
    Model,
    AdminStatus,
    Manufacturer,
    Hardware,
    Software,
    AlarmsStatus,

    // Port table
    PortNumber,
    Direction,
    TrunkAllowedVlan,
    Duplex,
    Speed,
    MacAddress,
    LogicalPortId,

    // Link table
    SwitchId1,
    PortId1,
    SwitchId2,
    PortId2,

    // Boundary table
    BoundaryId,
    CtrName1,
    DomainName1,
    LogicalPortId1,
    CtrName2,
    DomainName2,
    LogicalPortId2,
}

impl ColumnName {
    /// SQL column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnName::CtrName => "controller_name",
            ColumnName::DomainName => "domain_name",
            ColumnName::Description => "description",
            ColumnName::OperStatus => "oper_status",
            ColumnName::Valid => "valid",
            ColumnName::CsRowStatus => "cs_row_status",
            ColumnName::Type => "type",
            ColumnName::IpAddress => "ip_address",
            ColumnName::Ipv6Address => "ipv6_address",
            ColumnName::SwitchId => "switch_id",
            ColumnName::PortId => "port_id",
            ColumnName::Version => "version",
            ColumnName::UserName => "user_name",
            ColumnName::Password => "password",
            ColumnName::EnableAudit => "enable_audit",
            ColumnName::ActualVersion => "actual_version",
            ColumnName::PortType => "port_type",
            ColumnName::PhysicalPortId => "physical_port_id",
            ColumnName::OperDownCriteria => "oper_down_criteria",
            ColumnName::Model => "model",
            ColumnName::AdminStatus => "admin_status",
            ColumnName::Manufacturer => "manufacturer",
            ColumnName::Hardware => "hardware",
            ColumnName::Software => "software",
            ColumnName::AlarmsStatus => "alarms_status",
            ColumnName::PortNumber => "port_number",
            ColumnName::Direction => "direction",
            ColumnName::TrunkAllowedVlan => "trunk_allowed_vlan",
            ColumnName::Duplex => "duplex",
            ColumnName::Speed => "speed",
            ColumnName::MacAddress => "mac_address",
            ColumnName::LogicalPortId => "logical_port_id",
            ColumnName::SwitchId1 => "switch_id1",
            ColumnName::PortId1 => "port_id1",
            ColumnName::SwitchId2 => "switch_id2",
            ColumnName::PortId2 => "port_id2",
            ColumnName::BoundaryId => "boundary_id",
            ColumnName::CtrName1 => "controller_name1",
            ColumnName::DomainName1 => "domain_name1",
            ColumnName::LogicalPortId1 => "logical_port_id1",
            ColumnName::CtrName2 => "controller_name2",
            ColumnName::DomainName2 => "domain_name2",
            ColumnName::LogicalPortId2 => "logical_port_id2",
        }
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed set of physical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Controller,
    CtrDomain,
    LogicalPort,
    LogicalMemberPort,
    Switch,
    Port,
    Link,
    Boundary,
}

/// All table kinds, in catalog order.
pub const ALL_TABLES: &[TableKind] = &[
    TableKind::Controller,
    TableKind::CtrDomain,
    TableKind::LogicalPort,
    TableKind::LogicalMemberPort,
    TableKind::Switch,
    TableKind::Port,
    TableKind::Link,
    TableKind::Boundary,
];

/// Static description of one physical table.
#[derive(Debug)]
pub struct TableDef {
    pub table: TableKind,
    /// SQL table name
    pub name: &'static str,
    /// Columns in statement order, with their declared types
    pub columns: &'static [(ColumnName, AttrType)],
    /// Full composite key, in predicate-significance order
    pub primary_keys: &'static [ColumnName],
}

impl TableDef {
    /// Declared type of a column, if the table defines it.
    pub fn column_type(&self, name: ColumnName) -> Option<AttrType> {
        self.columns.iter().find(|(c, _)| *c == name).map(|(_, t)| *t)
    }

    /// Position of a column in statement order.
    pub fn column_index(&self, name: ColumnName) -> Option<usize> {
        self.columns.iter().position(|(c, _)| *c == name)
    }

    pub fn is_primary_key(&self, name: ColumnName) -> bool {
        self.primary_keys.contains(&name)
    }
}

static CONTROLLER_DEF: TableDef = TableDef {
    table: TableKind::Controller,
    name: "controller_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::Type, AttrType::Uint16),
        (ColumnName::Version, AttrType::Bytes(32)),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::IpAddress, AttrType::Ipv4),
        (ColumnName::UserName, AttrType::Bytes(32)),
        (ColumnName::Password, AttrType::Bytes(257)),
        (ColumnName::EnableAudit, AttrType::Uint16),
        (ColumnName::ActualVersion, AttrType::Bytes(32)),
        (ColumnName::OperStatus, AttrType::Uint16),
        (ColumnName::Valid, AttrType::Bytes(10)),
        (ColumnName::CsRowStatus, AttrType::Uint16),
    ],
    primary_keys: &[ColumnName::CtrName],
};

static CTR_DOMAIN_DEF: TableDef = TableDef {
    table: TableKind::CtrDomain,
    name: "ctr_domain_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::DomainName, AttrType::Bytes(32)),
        (ColumnName::Type, AttrType::Uint16),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::OperStatus, AttrType::Uint16),
        (ColumnName::Valid, AttrType::Bytes(3)),
        (ColumnName::CsRowStatus, AttrType::Uint16),
    ],
    primary_keys: &[ColumnName::CtrName, ColumnName::DomainName],
};

static LOGICAL_PORT_DEF: TableDef = TableDef {
    table: TableKind::LogicalPort,
    name: "logicalport_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::DomainName, AttrType::Bytes(32)),
        (ColumnName::PortId, AttrType::Bytes(320)),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::PortType, AttrType::Uint16),
        (ColumnName::SwitchId, AttrType::Bytes(256)),
        (ColumnName::PhysicalPortId, AttrType::Bytes(32)),
        (ColumnName::OperDownCriteria, AttrType::Uint16),
        (ColumnName::OperStatus, AttrType::Uint16),
        (ColumnName::Valid, AttrType::Bytes(6)),
    ],
    primary_keys: &[ColumnName::CtrName, ColumnName::DomainName, ColumnName::PortId],
};

static LOGICAL_MEMBER_PORT_DEF: TableDef = TableDef {
    table: TableKind::LogicalMemberPort,
    name: "logical_memberport_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::DomainName, AttrType::Bytes(32)),
        (ColumnName::PortId, AttrType::Bytes(320)),
        (ColumnName::SwitchId, AttrType::Bytes(256)),
        (ColumnName::PhysicalPortId, AttrType::Bytes(32)),
    ],
    primary_keys: &[
        ColumnName::CtrName,
        ColumnName::DomainName,
        ColumnName::PortId,
        ColumnName::SwitchId,
        ColumnName::PhysicalPortId,
    ],
};

static SWITCH_DEF: TableDef = TableDef {
    table: TableKind::Switch,
    name: "switch_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::SwitchId, AttrType::Bytes(256)),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::Model, AttrType::Bytes(16)),
        (ColumnName::IpAddress, AttrType::Ipv4),
        (ColumnName::Ipv6Address, AttrType::Ipv6),
        (ColumnName::AdminStatus, AttrType::Uint16),
        (ColumnName::DomainName, AttrType::Bytes(32)),
        (ColumnName::OperStatus, AttrType::Uint16),
        (ColumnName::Manufacturer, AttrType::Bytes(256)),
        (ColumnName::Hardware, AttrType::Bytes(256)),
        (ColumnName::Software, AttrType::Bytes(256)),
        (ColumnName::AlarmsStatus, AttrType::Uint64),
        (ColumnName::Valid, AttrType::Bytes(11)),
    ],
    primary_keys: &[ColumnName::CtrName, ColumnName::SwitchId],
};

static PORT_DEF: TableDef = TableDef {
    table: TableKind::Port,
    name: "port_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::SwitchId, AttrType::Bytes(256)),
        (ColumnName::PortId, AttrType::Bytes(32)),
        (ColumnName::PortNumber, AttrType::Uint32),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::AdminStatus, AttrType::Uint16),
        (ColumnName::Direction, AttrType::Uint16),
        (ColumnName::TrunkAllowedVlan, AttrType::Bytes(2)),
        (ColumnName::OperStatus, AttrType::Uint16),
        (ColumnName::MacAddress, AttrType::Bytes(6)),
        (ColumnName::Duplex, AttrType::Uint16),
        (ColumnName::Speed, AttrType::Uint64),
        (ColumnName::AlarmsStatus, AttrType::Uint64),
        (ColumnName::LogicalPortId, AttrType::Bytes(320)),
        (ColumnName::Valid, AttrType::Bytes(11)),
    ],
    primary_keys: &[ColumnName::CtrName, ColumnName::SwitchId, ColumnName::PortId],
};

static LINK_DEF: TableDef = TableDef {
    table: TableKind::Link,
    name: "link_table",
    columns: &[
        (ColumnName::CtrName, AttrType::Bytes(32)),
        (ColumnName::SwitchId1, AttrType::Bytes(256)),
        (ColumnName::PortId1, AttrType::Bytes(32)),
        (ColumnName::SwitchId2, AttrType::Bytes(256)),
        (ColumnName::PortId2, AttrType::Bytes(32)),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::OperStatus, AttrType::Uint16),
        (ColumnName::Valid, AttrType::Bytes(2)),
    ],
    primary_keys: &[
        ColumnName::CtrName,
        ColumnName::SwitchId1,
        ColumnName::PortId1,
        ColumnName::SwitchId2,
        ColumnName::PortId2,
    ],
};

static BOUNDARY_DEF: TableDef = TableDef {
    table: TableKind::Boundary,
    name: "boundary_table",
    columns: &[
        (ColumnName::BoundaryId, AttrType::Bytes(32)),
        (ColumnName::Description, AttrType::Bytes(128)),
        (ColumnName::CtrName1, AttrType::Bytes(32)),
        (ColumnName::DomainName1, AttrType::Bytes(32)),
        (ColumnName::LogicalPortId1, AttrType::Bytes(320)),
        (ColumnName::CtrName2, AttrType::Bytes(32)),
        (ColumnName::DomainName2, AttrType::Bytes(32)),
        (ColumnName::LogicalPortId2, AttrType::Bytes(320)),
        (ColumnName::Valid, AttrType::Bytes(8)),
        (ColumnName::CsRowStatus, AttrType::Uint16),
    ],
    primary_keys: &[ColumnName::BoundaryId],
};

impl TableKind {
    /// The static definition for this table kind.
    ///
    /// The match is exhaustive: adding a table without a definition does not
    /// compile.
    pub fn def(self) -> &'static TableDef {
        match self {
            TableKind::Controller => &CONTROLLER_DEF,
            TableKind::CtrDomain => &CTR_DOMAIN_DEF,
            TableKind::LogicalPort => &LOGICAL_PORT_DEF,
            TableKind::LogicalMemberPort => &LOGICAL_MEMBER_PORT_DEF,
            TableKind::Switch => &SWITCH_DEF,
            TableKind::Port => &PORT_DEF,
            TableKind::Link => &LINK_DEF,
            TableKind::Boundary => &BOUNDARY_DEF,
        }
    }

    /// SQL table name.
    pub fn table_name(self) -> &'static str {
        self.def().name
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}
