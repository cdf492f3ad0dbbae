//! Integration test: framed method calls over a loopback TCP socket.

use std::net::SocketAddr;
use std::sync::Arc;

use rich_clipboard::{ClipboardService, MemoryClipboard, NativeFormats};
use rich_clipboard_protocol::{split_tcp, ChannelClient, Dispatcher};
use rich_clipboard_types::{ClipboardSnapshot, MethodCall, MethodResponse, Mime, Value};
use tokio::net::TcpListener;

const RTF: &str = r"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}hello {\b there}}";

/// Serve exactly one connection with a dispatcher over `clipboard`.
async fn serve_one(clipboard: MemoryClipboard) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let formats = NativeFormats::new("public.utf8-plain-text", "public.html", "public.rtf");
    let dispatcher = Arc::new(Dispatcher::new(ClipboardService::with_formats(
        clipboard, formats,
    )));

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut tx, mut rx) = split_tcp(stream);
        while let Ok(Some(call)) = rx.recv::<MethodCall>().await {
            let dispatcher = Arc::clone(&dispatcher);
            let response = tokio::task::spawn_blocking(move || dispatcher.dispatch(&call))
                .await
                .unwrap();
            tx.send(&response).await.unwrap();
        }
    });

    addr
}

#[tokio::test]
async fn set_and_get_over_loopback() {
    let clipboard = MemoryClipboard::new();
    let handle = clipboard.handle();
    let addr = serve_one(clipboard).await;
    let mut client = ChannelClient::connect(addr).await.unwrap();

    let snapshot =
        ClipboardSnapshot::text("hello there").with(Mime::TextHtml, "<h1>hello there</h1>");
    let set = client.set_data(snapshot.clone()).await.unwrap();
    assert_eq!(set, MethodResponse::Success(Value::Null));
    assert_eq!(handle.formats(), ["public.utf8-plain-text", "public.html"]);

    let get = client.get_data().await.unwrap();
    assert_eq!(get, MethodResponse::success(snapshot));

    client.close().await.unwrap();
}

#[tokio::test]
async fn rich_text_fallback_over_loopback() {
    let clipboard = MemoryClipboard::new();
    let handle = clipboard.handle();
    handle.put("public.utf8-plain-text", "hello there");
    handle.put("public.rtf", RTF);
    let addr = serve_one(clipboard).await;
    let mut client = ChannelClient::connect(addr).await.unwrap();

    let response = client.get_data().await.unwrap();
    let map = response.value().and_then(Value::as_map).unwrap();
    let html = map.get("text/html").and_then(Value::as_str).unwrap();
    assert!(html.contains("hello <b>there</b>"), "{html}");

    let types = client.get_available_types().await.unwrap();
    assert_eq!(
        types,
        MethodResponse::success(vec![
            "public.utf8-plain-text".to_string(),
            "public.rtf".to_string()
        ])
    );
    assert_eq!(
        client.get_item_count().await.unwrap(),
        MethodResponse::success(1)
    );
}

#[tokio::test]
async fn unknown_methods_keep_the_connection_open() {
    let addr = serve_one(MemoryClipboard::new()).await;
    let mut client = ChannelClient::connect(addr).await.unwrap();

    let response = client.call_named("getImage", Value::Null).await.unwrap();
    assert_eq!(response, MethodResponse::NotImplemented);

    let count = client
        .call_named("RichClipboard.getItemCount", Value::Null)
        .await
        .unwrap();
    assert_eq!(count, MethodResponse::success(0));
}
