//! Inline-image expansion of rich-text fields, downloading attachments
//! through the authenticated gateway.

use adoapi::{AdoClient, Workitem};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

fn client_for(server: &MockServer) -> AdoClient {
    AdoClient::new("user", "secret", &server.uri(), "Aveyara", "project").unwrap()
}

fn workitem_with_description(client: &AdoClient, description: &str) -> Workitem {
    Workitem::from_json(
        &json!({
            "id": 1,
            "url": "http://fake/Aveyara/project/_apis/wit/workItems/1",
            "fields": {"System.Description": description}
        }),
        client,
    )
    .unwrap()
}

#[tokio::test]
async fn organization_hosted_images_become_data_uris() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Aveyara/_apis/wit/attachments/att-1"))
        .and(query_param("fileName", "shot.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PNG_BYTES, "image/png; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let org_base = client.organization_base_url();
    let description = format!(
        "<p>before</p>\
         <img src=\"{org_base}/_apis/wit/attachments/att-1?fileName=shot.png\" alt=\"x\">\
         <p>after</p>"
    );

    let workitem = workitem_with_description(&client, &description);
    let fields = workitem.text_area_fields_expanded().await.unwrap();

    assert_eq!(fields.len(), 1);
    assert_eq!(
        fields[0].content,
        "<p>before</p>\
         <img src=\"data:image/png;base64,iVBORw==\" alt=\"x\">\
         <p>after</p>"
    );
}

#[tokio::test]
async fn foreign_images_are_left_alone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let description = "<img src=\"http://elsewhere/x.png\"> plain text";

    let workitem = workitem_with_description(&client, description);
    let fields = workitem.text_area_fields_expanded().await.unwrap();
    assert_eq!(fields[0].content, description);
}

#[tokio::test]
async fn segment_without_closing_quote_is_kept_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let org_base = client.organization_base_url();
    let description = format!("<img src=\"{org_base}/_apis/wit/attachments/broken");

    let workitem = workitem_with_description(&client, &description);
    let fields = workitem.text_area_fields_expanded().await.unwrap();
    assert_eq!(fields[0].content, description);
}

#[tokio::test]
async fn missing_content_type_falls_back_to_a_generic_mime() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Aveyara/_apis/wit/attachments/att-2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let org_base = client.organization_base_url();
    let description =
        format!("<img src=\"{org_base}/_apis/wit/attachments/att-2\">");

    let workitem = workitem_with_description(&client, &description);
    let fields = workitem.text_area_fields_expanded().await.unwrap();
    assert!(
        fields[0].content.starts_with("<img src=\"data:"),
        "{}",
        fields[0].content
    );
    assert!(fields[0].content.contains(";base64,iVBORw==\">"));
}
