use super::{ConsulClient, ConsulConfig, KvStore, Registry};
use crate::client_error::ClientError;
use mockito::{mock, Matcher};
use reqwest::StatusCode;

fn client() -> ConsulClient {
    ConsulClient::new(ConsulConfig::new(&mockito::server_url()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_healthy_instances() {
    let _mock = mock("GET", "/v1/health/service/web")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("passing".into(), "true".into()),
            Matcher::UrlEncoded("tag".into(), "dev".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"
            [
                {"Node": {"Node": "n1", "Address": "10.0.0.1"},
                 "Service": {"ID": "web-1", "Address": "10.0.0.5", "Port": 8080}},
                {"Node": {"Node": "n2", "Address": "10.0.0.2"},
                 "Service": {"ID": "web-2", "Address": "", "Port": 0}}
            ]
        "#,
        )
        .create();

    let locations = client().healthy_instances("web", "dev").await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].host, "10.0.0.5");
    assert_eq!(locations[0].port, Some(8080));
    // 空的服务地址回落到节点地址
    assert_eq!(locations[1].host, "10.0.0.2");
    assert_eq!(locations[1].port, None);
}

#[tokio::test]
async fn test_healthy_instances_unknown_service() {
    let _mock = mock("GET", "/v1/health/service/ghost")
        .match_query(Matcher::UrlEncoded("passing".into(), "true".into()))
        .with_status(200)
        .with_body("[]")
        .create();

    let locations = client().healthy_instances("ghost", "").await.unwrap();
    assert!(locations.is_empty());
}

#[tokio::test]
async fn test_healthy_instances_500() {
    let _mock = mock("GET", "/v1/health/service/web")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("rpc error")
        .create();

    let err = client().healthy_instances("web", "dev").await.unwrap_err();
    match err {
        ClientError::Upstream(status, body) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "rpc error");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_token_and_datacenter() {
    let _mock = mock("GET", "/v1/health/service/web")
        .match_header("authorization", "Bearer secret")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("dc".into(), "dc2".into()),
            Matcher::UrlEncoded("passing".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"Node": {"Address": "n"}, "Service": {"Address": "a", "Port": 1}}]"#)
        .create();

    let config = ConsulConfig::new(&mockito::server_url())
        .unwrap()
        .with_token("secret")
        .with_datacenter("dc2");
    let client = ConsulClient::new(config).unwrap();

    let locations = client.healthy_instances("web", "").await.unwrap();
    assert_eq!(locations.len(), 1);
}

#[tokio::test]
async fn test_unreachable_consul() {
    let client = ConsulClient::new(ConsulConfig::new("http://127.0.0.1:1").unwrap()).unwrap();
    let err = client.healthy_instances("web", "dev").await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream(_, _)));
}

#[tokio::test]
async fn test_kv_put() {
    let _mock = mock("PUT", "/v1/kv/dev/config/db/host")
        .match_body(Matcher::Exact("localhost".into()))
        .with_status(200)
        .with_body("true")
        .create();

    let result = client().put("dev/config/db/host", b"localhost").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_kv_put_rejected() {
    let _mock = mock("PUT", "/v1/kv/dev/config/db/host")
        .with_status(200)
        .with_body("false")
        .create();

    let err = client().put("dev/config/db/host", b"x").await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream(StatusCode::OK, _)));
}

#[tokio::test]
async fn test_kv_list() {
    let _mock = mock("GET", "/v1/kv/dev/config")
        .match_query(Matcher::UrlEncoded("recurse".into(), "true".into()))
        .with_status(200)
        .with_body(
            r#"
            [
                {"Key": "dev/config/db/port", "Value": "NTQzMg==", "Flags": 0},
                {"Key": "dev/config/empty", "Value": null, "Flags": 0}
            ]
        "#,
        )
        .create();

    let pairs = client().list("dev/config").await.unwrap();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].key, "dev/config/db/port");
    assert_eq!(pairs[0].value, b"5432".to_vec());
    assert!(pairs[1].value.is_empty());
}

#[tokio::test]
async fn test_kv_list_missing_prefix() {
    let _mock = mock("GET", "/v1/kv/nothing")
        .match_query(Matcher::Any)
        .with_status(404)
        .create();

    let pairs = client().list("nothing").await.unwrap();
    assert!(pairs.is_empty());
}

#[tokio::test]
async fn test_kv_put_encodes_key_segments() {
    let sibling = mock("PUT", "/v1/kv/ns/a")
        .with_status(200)
        .with_body("true")
        .expect(0)
        .create();
    let encoded = mock("PUT", "/v1/kv/ns/a%23b")
        .match_body(Matcher::Exact("1".into()))
        .with_status(200)
        .with_body("true")
        .create();

    client().put("ns/a#b", b"1").await.unwrap();

    encoded.assert();
    sibling.assert();
}

#[tokio::test]
async fn test_kv_list_encodes_query_chars_in_prefix() {
    let _mock = mock("GET", "/v1/kv/dev/a%3Fb")
        .match_query(Matcher::UrlEncoded("recurse".into(), "true".into()))
        .with_status(200)
        .with_body(r#"[{"Key": "dev/a?b/x", "Value": "eA=="}]"#)
        .create();

    let pairs = client().list("dev/a?b").await.unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].value, b"x".to_vec());
}

#[tokio::test]
async fn test_service_name_is_one_segment() {
    let _mock = mock("GET", "/v1/health/service/web%2Fadmin")
        .match_query(Matcher::UrlEncoded("passing".into(), "true".into()))
        .with_status(200)
        .with_body(r#"[{"Node": {"Address": "n"}, "Service": {"Address": "a", "Port": 1}}]"#)
        .create();

    let locations = client().healthy_instances("web/admin", "").await.unwrap();
    assert_eq!(locations.len(), 1);
}
