use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use zarela_core::error::RetrievalError;
use zarela_core::retrieve::http::{HttpGateway, RpcDecryptor};
use zarela_core::retrieve::{Decryptor, Gateway};
use zarela_core::{Address, ContentHash};

const VIEWER: &str = "0x00000000000000000000000000000000000000cc";

async fn ipfs(Path(hash): Path<String>) -> Result<String, StatusCode> {
    match hash.as_str() {
        "QmKnown" => Ok("sealed-box".into()),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn rpc(Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default();
    let params = &req["params"];
    if method != "eth_decrypt" {
        return Json(json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32601, "message": "method not found"}}));
    }
    if params[0] == "sealed-box" && params[1] == VIEWER {
        Json(json!({"jsonrpc": "2.0", "id": id, "result": "JVBERi0xLjcK"}))
    } else {
        Json(json!({"jsonrpc": "2.0", "id": id, "error": {"code": 4001, "message": "User denied message decryption"}}))
    }
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/ipfs/{hash}", get(ipfs))
        .route("/rpc", post(rpc));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn gateway_fetches_and_reports_status() {
    let addr = serve().await;
    let gw = HttpGateway::new(format!("http://{addr}/"));

    let known = ContentHash::parse("QmKnown").unwrap();
    assert_eq!(gw.url_for(&known), format!("http://{addr}/ipfs/QmKnown"));
    assert_eq!(gw.fetch(&known).await.unwrap(), "sealed-box");

    let err = gw
        .fetch(&ContentHash::parse("QmGone").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Fetch(ref m) if m.contains("404")));
}

#[tokio::test]
async fn gateway_unreachable_is_a_fetch_error() {
    let gw = HttpGateway::new("http://127.0.0.1:9");
    let err = gw
        .fetch(&ContentHash::parse("QmKnown").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Fetch(_)));
}

#[tokio::test]
async fn rpc_decrypt_result_and_rejection() {
    let addr = serve().await;
    let dec = RpcDecryptor::new(format!("http://{addr}/rpc"));
    let viewer = Address::parse(VIEWER).unwrap();

    assert_eq!(dec.decrypt("sealed-box", &viewer).await.unwrap(), "JVBERi0xLjcK");

    let err = dec.decrypt("other-box", &viewer).await.unwrap_err();
    match err {
        RetrievalError::Decrypt(m) => assert!(m.contains("4001")),
        other => panic!("unexpected {other:?}"),
    }
}
