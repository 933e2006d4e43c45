use attribute_core::db::open_db_in_memory;
use attribute_core::{
    Attribute, AttributeChanges, AttributeGroup, AttributeInclude, AttributeObserver,
    AttributeRepository, AttributeService, AttributeServiceError, AttributeValidationError,
    DefaultMessages, HashIdCodec, IdCodec, NewAttribute, ReorderRequest,
    SqliteAttributeGroupRepository, SqliteAttributeRepository, DEFAULT_ATTRIBUTE_TYPE,
};
use rusqlite::Connection;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

type Service<'a> = AttributeService<
    SqliteAttributeRepository<'a>,
    SqliteAttributeGroupRepository<'a, &'a HashIdCodec>,
    &'a HashIdCodec,
>;

fn codec() -> HashIdCodec {
    HashIdCodec::new("attribute-service-tests", 6)
}

fn service<'a>(conn: &'a Connection, codec: &'a HashIdCodec) -> Service<'a> {
    AttributeService::new(
        SqliteAttributeRepository::try_new(conn).unwrap(),
        SqliteAttributeGroupRepository::try_new(conn, codec).unwrap(),
        codec,
    )
}

fn create_group(
    conn: &Connection,
    codec: &HashIdCodec,
    name: &str,
    handle: &str,
) -> (AttributeGroup, String) {
    let groups = SqliteAttributeGroupRepository::try_new(conn, codec).unwrap();
    let group = groups.create_group(name, handle).unwrap();
    let hashed = groups.hashed_id(&group).unwrap();
    (group, hashed)
}

fn attribute_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM attributes;", [], |row| row.get(0))
        .unwrap()
}

fn positions(service: &Service<'_>, group_id: i64) -> Vec<(String, i64)> {
    service
        .get_attributes_for_group(group_id)
        .unwrap()
        .into_iter()
        .map(|attribute| (attribute.handle, attribute.position))
        .collect()
}

#[test]
fn create_appends_positions_per_group() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let (_, seo_id) = create_group(&conn, &codec, "SEO", "seo");
    let service = service(&conn, &codec);

    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id.clone(), "Size", "size"))
        .unwrap();
    let title = service
        .create(NewAttribute::new(seo_id, "Meta title", "meta-title"))
        .unwrap();

    assert_eq!(color.position, 1);
    assert_eq!(size.position, 2);
    assert_eq!(title.position, 1);
    assert_eq!(color.group_id, specs.id);
    assert_eq!(service.get_last_item(specs.id).unwrap().unwrap().id, size.id);
}

#[test]
fn create_continues_after_highest_existing_position() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);

    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let request: ReorderRequest = [(service.hashed_id(color.id).unwrap(), 10)]
        .into_iter()
        .collect();
    service.reorder(&request).unwrap();

    let size = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap();
    assert_eq!(size.position, 11);
    assert_eq!(
        positions(&service, specs.id),
        vec![("color".to_string(), 10), ("size".to_string(), 11)]
    );
}

#[test]
fn create_after_maximum_position_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);

    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let request: ReorderRequest = [(service.hashed_id(color.id).unwrap(), i64::MAX)]
        .into_iter()
        .collect();
    service.reorder(&request).unwrap();

    let err = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap_err();
    assert!(matches!(
        err,
        AttributeServiceError::Validation(AttributeValidationError::PositionOverflow)
    ));
    assert_eq!(err.status_code(), 422);
    assert_eq!(attribute_count(&conn), 1);
    assert_eq!(
        positions(&service, specs.id),
        vec![("color".to_string(), i64::MAX)]
    );
}

#[test]
fn create_with_unknown_group_fails_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let service = service(&conn, &codec);

    let missing = codec.encode(999).unwrap();
    for group_id in [missing.as_str(), "not-a-group"] {
        let err = service
            .create(NewAttribute::new(group_id, "Color", "color"))
            .unwrap_err();
        assert!(matches!(err, AttributeServiceError::GroupNotFound(ref id) if id == group_id));
        assert_eq!(err.status_code(), 400);
    }

    assert_eq!(attribute_count(&conn), 0);
}

#[test]
fn create_rejects_duplicate_name_within_group_only() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let (_, seo_id) = create_group(&conn, &codec, "SEO", "seo");
    let service = service(&conn, &codec);

    service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();

    let err = service
        .create(NewAttribute::new(specs_id, "Color", "colour"))
        .unwrap_err();
    match err {
        AttributeServiceError::NameTaken { ref name, group_id } => {
            assert_eq!(name, "Color");
            assert_eq!(group_id, specs.id);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.status_code(), 422);

    service
        .create(NewAttribute::new(seo_id, "Color", "color"))
        .expect("same name in another group is allowed");
    assert_eq!(attribute_count(&conn), 2);
}

#[test]
fn create_rejects_invalid_handle() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);

    let err = service
        .create(NewAttribute::new(specs_id, "Color", "has space"))
        .unwrap_err();
    assert!(matches!(err, AttributeServiceError::Validation(_)));
    assert_eq!(err.status_code(), 422);
    assert_eq!(attribute_count(&conn), 0);
}

#[test]
fn create_then_fetch_by_hashed_id_round_trips_fields() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);

    let defaults = service
        .create(NewAttribute::new(specs_id.clone(), "Material", "material"))
        .unwrap();
    let explicit = service
        .create(NewAttribute {
            kind: Some("select".to_string()),
            variant: Some(true),
            searchable: Some(true),
            filterable: Some(false),
            ..NewAttribute::new(specs_id, "Size", "size")
        })
        .unwrap();

    let loaded = service
        .get_by_hashed_id(&service.hashed_id(defaults.id).unwrap())
        .unwrap();
    assert_eq!(loaded, defaults);
    assert_eq!(loaded.group_id, specs.id);
    assert_eq!(loaded.name, "Material");
    assert_eq!(loaded.handle, "material");
    assert_eq!(loaded.kind, DEFAULT_ATTRIBUTE_TYPE);
    assert!(!loaded.variant && !loaded.searchable && !loaded.filterable);

    let loaded = service
        .get_by_hashed_id(&service.hashed_id(explicit.id).unwrap())
        .unwrap();
    assert_eq!(loaded.kind, "select");
    assert!(loaded.variant);
    assert!(loaded.searchable);
    assert!(!loaded.filterable);
}

#[test]
fn get_by_hashed_id_with_loads_requested_relations() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap();

    let repo = SqliteAttributeRepository::try_new(&conn).unwrap();
    let link = repo.attach_attributable(color.id, "product", 12).unwrap();
    repo.set_attributable_value(link.id, "en", "Red").unwrap();

    let hashed = service.hashed_id(color.id).unwrap();
    let bare = service.get_by_hashed_id_with(&hashed, &[]).unwrap();
    assert_eq!(bare.group, None);
    assert_eq!(bare.attributables, None);

    let full = service
        .get_by_hashed_id_with(
            &hashed,
            &[AttributeInclude::Group, AttributeInclude::Attributables],
        )
        .unwrap();
    assert_eq!(full.group, Some(specs));
    let attributables = full.attributables.unwrap();
    assert_eq!(attributables.len(), 1);
    assert_eq!(attributables[0].records[0].value, "Red");
}

#[test]
fn get_by_hashed_id_fails_for_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let service = service(&conn, &codec);

    for hashed in [codec.encode(4242).unwrap(), "???".to_string()] {
        let err = service.get_by_hashed_id(&hashed).unwrap_err();
        assert!(matches!(err, AttributeServiceError::AttributeNotFound(_)));
        assert_eq!(err.status_code(), 404);
    }
}

#[test]
fn update_unknown_attribute_fails_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let service = service(&conn, &codec);

    let err = service
        .update(&codec.encode(77).unwrap(), &AttributeChanges::default())
        .unwrap_err();
    assert!(matches!(err, AttributeServiceError::AttributeNotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn update_merges_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let created = service
        .create(NewAttribute {
            kind: Some("select".to_string()),
            variant: Some(true),
            ..NewAttribute::new(specs_id, "Color", "color")
        })
        .unwrap();

    let changes: AttributeChanges =
        serde_json::from_value(json!({ "name": "Colour", "filterable": true })).unwrap();
    let updated = service
        .update(&service.hashed_id(created.id).unwrap(), &changes)
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Colour");
    assert!(updated.filterable);
    assert_eq!(updated.handle, "color");
    assert_eq!(updated.kind, "select");
    assert!(updated.variant);
    assert!(!updated.searchable);
    assert_eq!(updated.position, created.position);
    assert_eq!(updated.group_id, created.group_id);
}

#[test]
fn update_reassigns_group_when_group_id_present() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let (seo, seo_id) = create_group(&conn, &codec, "SEO", "seo");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap();
    let hashed = service.hashed_id(color.id).unwrap();

    let moved = service
        .update(
            &hashed,
            &AttributeChanges {
                group_id: Some(seo_id),
                ..AttributeChanges::default()
            },
        )
        .unwrap();
    assert_eq!(moved.group_id, seo.id);
    assert!(service.get_attributes_for_group(specs.id).unwrap().is_empty());

    let err = service
        .update(
            &hashed,
            &AttributeChanges {
                group_id: Some(codec.encode(999).unwrap()),
                ..AttributeChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AttributeServiceError::GroupNotFound(_)));
    assert_eq!(service.get_by_hashed_id(&hashed).unwrap().group_id, seo.id);
}

#[test]
fn update_rejects_name_taken_by_sibling_but_allows_own_name() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap();
    let hashed = service.hashed_id(size.id).unwrap();

    let err = service
        .update(
            &hashed,
            &AttributeChanges {
                name: Some("Color".to_string()),
                ..AttributeChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AttributeServiceError::NameTaken { .. }));

    let same = service
        .update(
            &hashed,
            &AttributeChanges {
                name: Some("Size".to_string()),
                searchable: Some(true),
                ..AttributeChanges::default()
            },
        )
        .unwrap();
    assert!(same.searchable);
}

#[test]
fn delete_removes_attribute() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap();
    let hashed = service.hashed_id(color.id).unwrap();

    assert!(service.delete(&hashed).unwrap());
    assert_eq!(attribute_count(&conn), 0);

    let err = service.delete(&hashed).unwrap_err();
    assert!(matches!(err, AttributeServiceError::AttributeNotFound(_)));
}

#[test]
fn reorder_applies_requested_positions() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id.clone(), "Size", "size"))
        .unwrap();
    let weight = service
        .create(NewAttribute::new(specs_id, "Weight", "weight"))
        .unwrap();

    let request: ReorderRequest = [
        (service.hashed_id(color.id).unwrap(), 3),
        (service.hashed_id(size.id).unwrap(), 1),
        (service.hashed_id(weight.id).unwrap(), 2),
    ]
    .into_iter()
    .collect();
    assert!(service.reorder(&request).unwrap());

    assert_eq!(
        positions(&service, specs.id),
        vec![
            ("size".to_string(), 1),
            ("weight".to_string(), 2),
            ("color".to_string(), 3),
        ]
    );
}

#[test]
fn update_attribute_positions_matches_reorder_and_skips_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap();

    let request: ReorderRequest = [
        (service.hashed_id(color.id).unwrap(), 2),
        (service.hashed_id(size.id).unwrap(), 1),
        (codec.encode(5000).unwrap(), 3),
    ]
    .into_iter()
    .collect();
    assert!(service.update_attribute_positions(&request).unwrap());

    assert_eq!(
        positions(&service, specs.id),
        vec![("size".to_string(), 1), ("color".to_string(), 2)]
    );
}

#[test]
fn reorder_with_duplicate_positions_fails_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap();

    let request: ReorderRequest = [
        (service.hashed_id(color.id).unwrap(), 5),
        (service.hashed_id(size.id).unwrap(), 5),
    ]
    .into_iter()
    .collect();
    let err = service.reorder(&request).unwrap_err();

    match err {
        AttributeServiceError::DuplicatePosition(ref message) => {
            assert_eq!(message, "Each attribute must have a unique position.");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.status_code(), 422);
    assert_eq!(
        positions(&service, specs.id),
        vec![("color".to_string(), 1), ("size".to_string(), 2)]
    );
}

#[test]
fn reorder_with_undecodable_id_fails_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap();

    let request: ReorderRequest = [
        (service.hashed_id(color.id).unwrap(), 4),
        ("bogus!".to_string(), 1),
    ]
    .into_iter()
    .collect();
    let err = service.update_attribute_positions(&request).unwrap_err();

    match err {
        AttributeServiceError::InvalidId {
            ref id,
            ref message,
        } => {
            assert_eq!(id, "bogus!");
            assert!(message.contains("bogus!"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.status_code(), 422);
    assert_eq!(positions(&service, specs.id), vec![("color".to_string(), 1)]);
}

#[test]
fn reorder_rejects_whitespace_padded_ids() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap();
    let hashed = service.hashed_id(color.id).unwrap();

    let padded = format!(" {hashed}");
    let request: ReorderRequest = [(hashed, 3), (padded.clone(), 7)].into_iter().collect();
    let err = service.reorder(&request).unwrap_err();

    assert!(matches!(err, AttributeServiceError::InvalidId { ref id, .. } if *id == padded));
    assert_eq!(positions(&service, specs.id), vec![("color".to_string(), 1)]);
}

#[test]
fn reorder_uses_injected_message_catalog() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec).with_messages(DefaultMessages::new().with_template(
        attribute_core::messages::DUPE_POSITION,
        "Positionen müssen eindeutig sein.",
    ));
    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap();

    let request: ReorderRequest = [
        (service.hashed_id(color.id).unwrap(), 1),
        (service.hashed_id(size.id).unwrap(), 1),
    ]
    .into_iter()
    .collect();
    let err = service.reorder(&request).unwrap_err();
    assert_eq!(err.to_string(), "Positionen müssen eindeutig sein.");
}

#[test]
fn name_exists_in_group_is_scoped_to_group() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (specs, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let (seo, _) = create_group(&conn, &codec, "SEO", "seo");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap();

    assert!(service.name_exists_in_group("Color", specs.id, None).unwrap());
    assert!(!service.name_exists_in_group("Color", seo.id, None).unwrap());
    assert!(!service
        .name_exists_in_group("Color", specs.id, Some(color.id))
        .unwrap());
}

#[test]
fn filterable_searchable_and_handle_queries() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute {
            filterable: Some(true),
            ..NewAttribute::new(specs_id.clone(), "Color", "color")
        })
        .unwrap();
    let size = service
        .create(NewAttribute {
            filterable: Some(true),
            searchable: Some(true),
            ..NewAttribute::new(specs_id.clone(), "Size", "size")
        })
        .unwrap();
    let notes = service
        .create(NewAttribute::new(specs_id, "Notes", "notes"))
        .unwrap();

    let ids = |attributes: Vec<Attribute>| -> Vec<i64> {
        attributes.into_iter().map(|attribute| attribute.id).collect()
    };
    assert_eq!(ids(service.get_filterable().unwrap()), vec![color.id, size.id]);
    assert_eq!(ids(service.get_searchable().unwrap()), vec![size.id]);
    assert_eq!(
        ids(service
            .get_by_handles(&["notes".to_string(), "color".to_string(), "missing".to_string()])
            .unwrap()),
        vec![color.id, notes.id]
    );
    assert!(service.get_by_handles(&[]).unwrap().is_empty());

    let handles = service.get_handles().unwrap();
    let pairs: Vec<(&str, i64)> = handles
        .iter()
        .map(|entry| (entry.handle.as_str(), entry.id))
        .collect();
    assert_eq!(
        pairs,
        vec![("color", color.id), ("size", size.id), ("notes", notes.id)]
    );
}

#[test]
fn get_attributables_filters_by_type_and_loads_records() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let service = service(&conn, &codec);
    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    let size = service
        .create(NewAttribute::new(specs_id, "Size", "size"))
        .unwrap();

    let repo = SqliteAttributeRepository::try_new(&conn).unwrap();
    let product_link = repo.attach_attributable(color.id, "product", 1).unwrap();
    repo.attach_attributable(color.id, "category", 9).unwrap();
    repo.set_attributable_value(product_link.id, "en", "Red").unwrap();
    repo.set_attributable_value(product_link.id, "de", "Rot").unwrap();

    let hashed = vec![
        service.hashed_id(color.id).unwrap(),
        service.hashed_id(size.id).unwrap(),
        "nope!".to_string(),
    ];

    let all = service.get_attributables(&hashed, None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].attribute.id, color.id);
    assert_eq!(all[0].attributables.len(), 2);
    assert!(all[1].attributables.is_empty());

    let products = service.get_attributables(&hashed, Some("product")).unwrap();
    let links = &products[0].attributables;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].attributable_type, "product");
    let locales: Vec<(&str, &str)> = links[0]
        .records
        .iter()
        .map(|record| (record.locale.as_str(), record.value.as_str()))
        .collect();
    assert_eq!(locales, vec![("de", "Rot"), ("en", "Red")]);
}

struct CountingObserver(Rc<Cell<usize>>);

impl AttributeObserver for CountingObserver {
    fn attribute_saved(&self, _attribute: &Attribute) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn observers_are_notified_on_successful_saves_only() {
    let conn = open_db_in_memory().unwrap();
    let codec = codec();
    let (_, specs_id) = create_group(&conn, &codec, "Specifications", "specs");
    let saved = Rc::new(Cell::new(0));
    let mut service = service(&conn, &codec);
    service.subscribe(CountingObserver(Rc::clone(&saved)));

    let color = service
        .create(NewAttribute::new(specs_id.clone(), "Color", "color"))
        .unwrap();
    assert_eq!(saved.get(), 1);

    service
        .create(NewAttribute::new(specs_id, "Color", "color"))
        .unwrap_err();
    assert_eq!(saved.get(), 1);

    service
        .update(
            &service.hashed_id(color.id).unwrap(),
            &AttributeChanges {
                variant: Some(true),
                ..AttributeChanges::default()
            },
        )
        .unwrap();
    assert_eq!(saved.get(), 2);
}
