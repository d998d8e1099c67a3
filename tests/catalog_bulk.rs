mod common;

use common::setup;
use pos_api::services::collections::CreateCollectionInput;
use pos_api::services::products::CreateProductInput;
use uuid::Uuid;

async fn create_product(app: &common::TestApp, name: &str) -> Uuid {
    app.services
        .products
        .create(CreateProductInput {
            name: name.to_string(),
            description: None,
            image_url: None,
        })
        .await
        .expect("product")
        .id
}

#[tokio::test]
async fn bulk_delete_rolls_back_when_any_product_is_missing() {
    let app = setup().await;
    let a = create_product(&app, "A").await;
    let b = create_product(&app, "B").await;

    let result = app
        .services
        .products
        .bulk_delete(vec![a, Uuid::new_v4(), b])
        .await;
    assert!(result.is_err());

    // Neither existing product was deleted.
    let (products, total) = app.services.products.list(1, 10).await.expect("list");
    assert_eq!(total, 2);
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn bulk_delete_removes_all_when_every_product_exists() {
    let app = setup().await;
    let a = create_product(&app, "A").await;
    let b = create_product(&app, "B").await;

    let deleted = app
        .services
        .products
        .bulk_delete(vec![a, b])
        .await
        .expect("bulk delete");
    assert_eq!(deleted, 2);

    let (_, total) = app.services.products.list(1, 10).await.expect("list");
    assert_eq!(total, 0);
}

#[tokio::test]
async fn bulk_assign_rolls_back_when_any_product_is_missing() {
    let app = setup().await;
    let collection = app
        .services
        .collections
        .create(CreateCollectionInput {
            name: "Featured".to_string(),
            description: None,
            image_url: None,
        })
        .await
        .expect("collection")
        .id;
    let a = create_product(&app, "A").await;

    let result = app
        .services
        .collections
        .bulk_assign(collection, vec![a, Uuid::new_v4()])
        .await;
    assert!(result.is_err());

    let members = app
        .services
        .collections
        .list_products(collection)
        .await
        .expect("members");
    assert!(members.is_empty());
}

#[tokio::test]
async fn bulk_assign_skips_already_linked_products() {
    let app = setup().await;
    let collection = app
        .services
        .collections
        .create(CreateCollectionInput {
            name: "Featured".to_string(),
            description: None,
            image_url: None,
        })
        .await
        .expect("collection")
        .id;
    let a = create_product(&app, "A").await;
    let b = create_product(&app, "B").await;

    app.services
        .collections
        .link_product(collection, a)
        .await
        .expect("link");

    let linked = app
        .services
        .collections
        .bulk_assign(collection, vec![a, b])
        .await
        .expect("bulk assign");
    assert_eq!(linked, 1);

    let members = app
        .services
        .collections
        .list_products(collection)
        .await
        .expect("members");
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn deleting_a_product_detaches_it_from_collections() {
    let app = setup().await;
    let collection = app
        .services
        .collections
        .create(CreateCollectionInput {
            name: "Featured".to_string(),
            description: None,
            image_url: None,
        })
        .await
        .expect("collection")
        .id;
    let a = create_product(&app, "A").await;

    app.services
        .collections
        .link_product(collection, a)
        .await
        .expect("link");
    app.services.products.delete(a).await.expect("delete");

    let members = app
        .services
        .collections
        .list_products(collection)
        .await
        .expect("members");
    assert!(members.is_empty());
}
