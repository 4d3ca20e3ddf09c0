//! Property-based marshalling tests (proptest).

use proptest::prelude::*;

use topostore::schema::{reorder_col_attrs, ColumnAttr, ColumnName, Row};
use topostore::value::{AttrType, AttrValue, ByteArray, BYTE_CAPACITIES};

fn capacity_strategy() -> impl Strategy<Value = usize> {
    prop::sample::select(BYTE_CAPACITIES.to_vec())
}

proptest! {
    #[test]
    fn prop_uint16_text_round_trip(v: u16) {
        let value = AttrValue::parse(AttrType::Uint16, &v.to_string()).unwrap();
        prop_assert_eq!(&value, &AttrValue::Uint16(v));
        prop_assert_eq!(AttrValue::parse(AttrType::Uint16, &value.to_text()).unwrap(), value);
    }

    #[test]
    fn prop_uint32_wire_round_trip(v: u32) {
        let value = AttrValue::Uint32(v);
        let wire = value.wire_bytes();
        prop_assert_eq!(wire.len(), 4);
        prop_assert_eq!(AttrValue::from_wire(AttrType::Uint32, &wire).unwrap(), value.clone());
        prop_assert_eq!(AttrValue::parse(AttrType::Uint32, &value.to_text()).unwrap(), value);
    }

    #[test]
    fn prop_uint64_wire_round_trip(v: u64) {
        let value = AttrValue::Uint64(v);
        let wire = value.wire_bytes();
        prop_assert_eq!(wire.len(), 8);
        prop_assert_eq!(AttrValue::from_wire(AttrType::Uint64, &wire).unwrap(), value);
    }

    #[test]
    fn prop_ipv4_wire_is_network_octets(a: u32) {
        let addr = std::net::Ipv4Addr::from(a);
        let value = AttrValue::Ipv4(addr);
        prop_assert_eq!(value.wire_bytes(), addr.octets().to_vec());
        prop_assert_eq!(AttrValue::from_wire(AttrType::Ipv4, &addr.octets()).unwrap(), value);
    }

    #[test]
    fn prop_ipv6_wire_is_network_octets(raw: [u8; 16]) {
        let addr = std::net::Ipv6Addr::from(raw);
        let value = AttrValue::Ipv6(addr);
        prop_assert_eq!(value.wire_bytes(), raw.to_vec());
        prop_assert_eq!(AttrValue::from_wire(AttrType::Ipv6, &raw).unwrap(), value.clone());
        prop_assert_eq!(AttrValue::parse(AttrType::Ipv6, &value.to_text()).unwrap(), value);
    }

    #[test]
    fn prop_byte_array_never_overruns_capacity(
        cap in capacity_strategy(),
        data in prop::collection::vec(any::<u8>(), 0..400),
    ) {
        let arr = ByteArray::copy_from(cap, &data).unwrap();
        prop_assert_eq!(arr.capacity(), cap);
        prop_assert!(arr.len() <= cap);
        let kept = data.len().min(cap);
        prop_assert_eq!(arr.as_value(), &data[..kept]);
        // Padding beyond the logical length is zero.
        prop_assert!(arr.as_bytes()[kept..].iter().all(|&b| b == 0));
    }

    #[test]
    fn prop_byte_array_wire_round_trip(
        cap in capacity_strategy(),
        data in prop::collection::vec(any::<u8>(), 0..400),
    ) {
        let value = AttrValue::Bytes(ByteArray::copy_from(cap, &data).unwrap());
        let wire = value.wire_bytes();
        prop_assert_eq!(wire.len(), cap);
        let back = AttrValue::from_wire(AttrType::Bytes(cap), &wire).unwrap();
        prop_assert_eq!(back.wire_bytes(), wire);
    }

    #[test]
    fn prop_reorder_is_stable_and_key_first(extra in 0usize..4) {
        // A row with keys scattered among non-key columns, in reverse order.
        let mut row: Row = vec![
            ColumnAttr::absent(ColumnName::Description, AttrType::Bytes(128)),
            ColumnAttr::absent(ColumnName::PortId2, AttrType::Bytes(32)),
            ColumnAttr::absent(ColumnName::OperStatus, AttrType::Uint16),
            ColumnAttr::absent(ColumnName::SwitchId1, AttrType::Bytes(256)),
            ColumnAttr::absent(ColumnName::CtrName, AttrType::Bytes(32)),
        ];
        for _ in 0..extra {
            row.push(ColumnAttr::absent(ColumnName::Valid, AttrType::Bytes(2)));
        }
        let keys = [ColumnName::CtrName, ColumnName::SwitchId1, ColumnName::PortId2];
        reorder_col_attrs(&keys, &mut row);

        let names: Vec<ColumnName> = row.iter().map(|a| a.name).collect();
        prop_assert_eq!(&names[..3], &keys[..]);
        // Non-key columns keep their relative order.
        prop_assert_eq!(names[3], ColumnName::Description);
        prop_assert_eq!(names[4], ColumnName::OperStatus);

        // Reordering again is a no-op.
        let before = names.clone();
        reorder_col_attrs(&keys, &mut row);
        let after: Vec<ColumnName> = row.iter().map(|a| a.name).collect();
        prop_assert_eq!(before, after);
    }
}
