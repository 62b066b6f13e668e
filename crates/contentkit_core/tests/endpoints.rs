use contentkit_core::db::open_db_in_memory;
use contentkit_core::{
    ApiResponse, CategoryAction, CategoryEndpoints, ResourceAction, ResourceEndpoints, ResourceId,
    ResourceValidator, SqliteDocumentStore, StoreReadModel, WriteModel, ARTICLE, CATEGORY,
};
use rusqlite::Connection;
use serde_json::{json, Value};

type Store<'conn> = SqliteDocumentStore<'conn>;
type Action<'conn> = ResourceAction<Store<'conn>, StoreReadModel<Store<'conn>>>;

struct Fixture<'conn> {
    article_validator: ResourceValidator<Store<'conn>>,
    article_action: Action<'conn>,
    categories: CategoryEndpoints<Store<'conn>, StoreReadModel<Store<'conn>>>,
}

impl<'conn> Fixture<'conn> {
    fn new(conn: &'conn Connection) -> Self {
        let store = SqliteDocumentStore::try_new(conn).unwrap();
        let category_action = CategoryAction::try_new(
            ResourceAction::new(
                WriteModel::new(store, &CATEGORY),
                StoreReadModel::new(store, &CATEGORY),
            ),
            WriteModel::new(store, &ARTICLE),
        )
        .unwrap();

        Self {
            article_validator: ResourceValidator::new(store, &ARTICLE),
            article_action: ResourceAction::new(
                WriteModel::new(store, &ARTICLE),
                StoreReadModel::new(store, &ARTICLE),
            ),
            categories: CategoryEndpoints::new(
                ResourceValidator::new(store, &CATEGORY),
                category_action,
            ),
        }
    }

    fn articles(&self) -> ResourceEndpoints<'_, Store<'conn>, StoreReadModel<Store<'conn>>> {
        ResourceEndpoints::new(&self.article_validator, &self.article_action)
    }

    fn create_category(&self, name: &str) -> String {
        let response = self.categories.create(&json!({"name": name}));
        assert_eq!(response.status, 201);
        id_of(&response)
    }

    fn create_article(&self, name: &str, category_id: &str) -> String {
        let response = self
            .articles()
            .create(&json!({"name": name, "categoryId": category_id}));
        assert_eq!(response.status, 201, "{}", response.body);
        id_of(&response)
    }
}

fn id_of(response: &ApiResponse) -> String {
    response.body["_id"].as_str().unwrap().to_string()
}

#[test]
fn create_article_with_unknown_category_is_404() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    let response = fixture.articles().create(&json!({
        "name": "Cheese sandwich",
        "categoryId": ResourceId::new().to_string(),
    }));
    assert_eq!(response.status, 404);
    assert_eq!(
        response.body,
        json!([{"param": "categoryId", "message": "category not found"}])
    );
}

#[test]
fn create_article_fills_nullable_fields() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let category_id = fixture.create_category("Food");

    let response = fixture.articles().create(&json!({
        "name": "Cheese sandwich",
        "categoryId": category_id,
    }));
    assert_eq!(response.status, 201);
    assert!(response.is_success());

    let body = &response.body;
    assert_eq!(body["name"], "Cheese sandwich");
    assert_eq!(body["categoryId"], Value::String(category_id));
    assert_eq!(body["text"], Value::Null);
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["isDeleted"], false);
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[test]
fn invalid_create_is_400_with_every_error() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    let response = fixture
        .articles()
        .create(&json!({"name": "", "categoryId": "bad-id"}));
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!([
            {"param": "name", "message": "Name is required"},
            {"param": "categoryId", "message": "Valid category id required"},
        ])
    );
}

#[test]
fn update_with_empty_name_is_rejected_and_row_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let category_id = fixture.create_category("Food");
    let article_id = fixture.create_article("Cheese sandwich", &category_id);
    let before = fixture.articles().get_one(&article_id);

    let response = fixture.articles().update(&article_id, &json!({"name": ""}));
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!([{"param": "name", "message": "Name is required"}])
    );

    let after = fixture.articles().get_one(&article_id);
    assert_eq!(after, before);
    assert_eq!(after.body["name"], "Cheese sandwich");
}

#[test]
fn update_merges_body_into_article() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let category_id = fixture.create_category("Food");
    let article_id = fixture.create_article("Cheese sandwich", &category_id);

    let response = fixture
        .articles()
        .update(&article_id, &json!({"text": "Bread and cheese", "_id": "ignored"}));
    assert_eq!(response.status, 200);
    assert_eq!(response.body["_id"], Value::String(article_id));
    assert_eq!(response.body["name"], "Cheese sandwich");
    assert_eq!(response.body["text"], "Bread and cheese");
}

#[test]
fn get_one_and_delete_report_missing_resources() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let category_id = fixture.create_category("Food");
    let article_id = fixture.create_article("Cheese sandwich", &category_id);

    assert_eq!(fixture.articles().get_one("bad-id").status, 400);

    let deleted = fixture.articles().delete(&article_id);
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.body["isDeleted"], true);

    let missing = fixture.articles().get_one(&article_id);
    assert_eq!(missing.status, 404);
    assert_eq!(
        missing.body,
        json!([{"param": "_id", "message": "article not found"}])
    );
    assert_eq!(fixture.articles().delete(&article_id).status, 404);
    assert_eq!(fixture.articles().get_all().body, json!([]));
}

#[test]
fn get_by_category_lists_children() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let food = fixture.create_category("Food");
    let tools = fixture.create_category("Tools");
    let sandwich = fixture.create_article("Cheese sandwich", &food);
    fixture.create_article("Hammer", &tools);

    let response = fixture.articles().get_by_category(&food);
    assert_eq!(response.status, 200);
    let listed = response.body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["_id"], Value::String(sandwich));

    let unknown = fixture
        .articles()
        .get_by_category(&ResourceId::new().to_string());
    assert_eq!(unknown.status, 404);
}

#[test]
fn category_delete_cascades_and_reports_count() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let food = fixture.create_category("Food");
    let sandwich = fixture.create_article("Cheese sandwich", &food);

    let response = fixture.categories.delete(&food);
    assert_eq!(response.status, 200);
    assert_eq!(response.body["affected"], 1);
    assert_eq!(response.body["category"]["isDeleted"], true);

    assert_eq!(fixture.articles().get_one(&sandwich).status, 404);
    assert_eq!(fixture.categories.delete(&food).status, 404);
}

#[test]
fn category_merge_moves_articles() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let snacks = fixture.create_category("Snacks");
    let food = fixture.create_category("Food");
    let sandwich = fixture.create_article("Cheese sandwich", &snacks);

    let response = fixture.categories.merge(&snacks, &food);
    assert_eq!(response.status, 200);
    assert_eq!(response.body["affected"], 1);

    let moved = fixture.articles().get_one(&sandwich);
    assert_eq!(moved.body["categoryId"], Value::String(food.clone()));
    assert_eq!(fixture.categories.get_one(&snacks).status, 404);

    let self_merge = fixture.categories.merge(&food, &food);
    assert_eq!(self_merge.status, 400);
}

#[test]
fn storage_failures_map_to_generic_500() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let category_id = fixture.create_category("Food");
    conn.execute_batch("DROP TABLE documents;").unwrap();

    let response = fixture.articles().create(&json!({
        "name": "Cheese sandwich",
        "categoryId": category_id,
    }));
    assert_eq!(response.status, 500);
    assert_eq!(response.body, json!({"message": "Internal server error"}));
}

#[test]
fn mixed_case_category_ids_are_stored_canonically_and_cascade() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let food = fixture.create_category("Food");
    let tools = fixture.create_category("Tools");
    let sandwich = fixture.create_article("Cheese sandwich", &food.to_uppercase());
    assert_eq!(
        fixture.articles().get_one(&sandwich).body["categoryId"],
        Value::String(food.clone())
    );

    let hammer = fixture.create_article("Hammer", &food);
    let moved = fixture
        .articles()
        .update(&hammer, &json!({"categoryId": tools.to_uppercase()}));
    assert_eq!(moved.status, 200);
    assert_eq!(moved.body["categoryId"], Value::String(tools.clone()));

    let listed = fixture.articles().get_by_category(&food);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let response = fixture.categories.delete(&food);
    assert_eq!(response.body["affected"], 1);
    assert_eq!(fixture.articles().get_one(&sandwich).status, 404);
    assert_eq!(fixture.articles().get_one(&hammer).status, 200);
}

#[test]
fn subcategory_parent_ids_are_stored_canonically() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let food = fixture.create_category("Food");

    let response = fixture
        .categories
        .create(&json!({"name": "Sandwiches", "parent": food.to_uppercase()}));
    assert_eq!(response.status, 201);
    assert_eq!(response.body["parent"], Value::String(food.clone()));
    assert_eq!(
        fixture.categories.get_by_category(&food).body.as_array().unwrap().len(),
        1
    );
}

#[test]
fn every_category_delete_entry_point_removes_articles() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);
    let food = fixture.create_category("Food");
    let sandwich = fixture.create_article("Cheese sandwich", &food);

    let response = fixture.categories.delete(&food);
    assert_eq!(response.status, 200);
    assert_eq!(fixture.categories.get_one(&food).status, 404);
    assert_eq!(fixture.articles().get_one(&sandwich).status, 404);
    assert_eq!(fixture.articles().get_by_category(&food).status, 404);

    let snacks = fixture.create_category("Snacks");
    let chips = fixture.create_article("Chips", &snacks);
    let merged_into = fixture.create_category("Food again");
    assert_eq!(fixture.categories.merge(&snacks, &merged_into).status, 200);
    assert_eq!(fixture.categories.get_one(&snacks).status, 404);
    assert_eq!(fixture.articles().get_one(&chips).status, 200);
}
