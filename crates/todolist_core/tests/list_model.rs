use todolist_core::{Category, Item, ItemPartition, ListView, RecordRef};
use uuid::Uuid;

fn sample_category() -> Category {
    Category {
        id: Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap(),
        name: "Work".to_string(),
        done: false,
        sort_order: 0,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

fn sample_item(category: &Category) -> Item {
    Item {
        id: Uuid::parse_str("66666666-7777-4888-8999-aaaaaaaaaaaa").unwrap(),
        category_id: category.id,
        name: "Email".to_string(),
        done: true,
        sort_order: 3,
        created_at: 1_700_000_100_000,
        updated_at: 1_700_000_200_000,
    }
}

#[test]
fn item_serialization_uses_expected_wire_fields() {
    let category = sample_category();
    let item = sample_item(&category);

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], item.id.to_string());
    assert_eq!(json["category_id"], category.id.to_string());
    assert_eq!(json["name"], "Email");
    assert_eq!(json["done"], true);
    assert_eq!(json["created_at"], 1_700_000_100_000_i64);

    let decoded: Item = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, item);
}

#[test]
fn record_ref_is_tagged_by_kind() {
    let id = Uuid::new_v4();
    let json = serde_json::to_value(RecordRef::Item(id)).unwrap();
    assert_eq!(json["kind"], "item");
    assert_eq!(json["id"], id.to_string());
    assert_eq!(RecordRef::Category(id).to_string(), format!("category {id}"));
}

#[test]
fn list_view_is_tagged_for_the_ui() {
    let category = sample_category();
    let item = sample_item(&category);
    let view = ListView::Split {
        category,
        partition: ItemPartition::from_items(vec![item]),
    };

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["view"], "split");
    assert_eq!(json["partition"]["done"][0]["name"], "Email");
    assert_eq!(json["partition"]["pending"], serde_json::json!([]));
    assert_eq!(view.row_count(), 1);
}
