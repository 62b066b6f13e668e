use contentkit_core::db::open_db_in_memory;
use contentkit_core::{
    Document, Projection, ReadModel, ResourceAction, ResourceId, SqliteDocumentStore,
    StoreReadModel, StoreResult, WriteModel, ARTICLE, CATEGORY,
};
use serde_json::json;
use std::cell::RefCell;

#[derive(Default)]
struct RecordingReadModel {
    changes: RefCell<Vec<(&'static str, ResourceId)>>,
}

impl ReadModel for RecordingReadModel {
    fn find_all(&self) -> StoreResult<Vec<Document>> {
        Ok(Vec::new())
    }

    fn find_by_id(&self, _id: ResourceId) -> StoreResult<Option<Document>> {
        Ok(None)
    }

    fn project(&self, change: Projection<'_>) -> StoreResult<()> {
        self.changes
            .borrow_mut()
            .push((change.label(), change.document().id));
        Ok(())
    }
}

#[test]
fn writes_notify_projection_after_matching_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let action = ResourceAction::new(
        WriteModel::new(store, &CATEGORY),
        RecordingReadModel::default(),
    );

    let created = action
        .create(json!({"name": "Food"}).as_object().unwrap())
        .unwrap();
    action
        .update(created.id, json!({"name": "Meals"}).as_object().unwrap())
        .unwrap()
        .unwrap();
    action.delete(created.id).unwrap().unwrap();
    assert!(action.delete(created.id).unwrap().is_none());
    assert!(action
        .update(ResourceId::new(), json!({"name": "x"}).as_object().unwrap())
        .unwrap()
        .is_none());

    let changes = action.read_model().changes.borrow().clone();
    assert_eq!(
        changes,
        vec![
            ("created", created.id),
            ("updated", created.id),
            ("deleted", created.id),
        ]
    );
}

#[test]
fn read_path_lags_write_path_without_propagation() {
    let write_conn = open_db_in_memory().unwrap();
    let read_conn = open_db_in_memory().unwrap();
    let write_store = SqliteDocumentStore::try_new(&write_conn).unwrap();
    let read_store = SqliteDocumentStore::try_new(&read_conn).unwrap();
    let action = ResourceAction::new(
        WriteModel::new(write_store, &CATEGORY),
        StoreReadModel::new(read_store, &CATEGORY),
    );

    let created = action
        .create(json!({"name": "Food"}).as_object().unwrap())
        .unwrap();

    assert_eq!(action.get_one(created.id).unwrap(), Some(created.clone()));
    assert_eq!(action.get_all().unwrap().len(), 1);
    assert!(action.get_one_read(created.id).unwrap().is_none());
    assert!(action.get_all_read().unwrap().is_empty());
}

#[test]
fn read_path_sees_rows_sharing_the_write_store() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let action = ResourceAction::new(
        WriteModel::new(store, &ARTICLE),
        StoreReadModel::new(store, &ARTICLE),
    );
    let category_id = ResourceId::new();

    let created = action
        .create(
            json!({"name": "Cheese sandwich", "categoryId": category_id.to_string()})
                .as_object()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(action.get_one_read(created.id).unwrap(), Some(created.clone()));
    assert_eq!(action.get_by_category(category_id).unwrap(), vec![created.clone()]);

    action.delete(created.id).unwrap();
    assert!(action.get_all_read().unwrap().is_empty());
    assert!(action.get_by_category(category_id).unwrap().is_empty());
}
