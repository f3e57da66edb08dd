use perp_agent_bybit::{ApiError, BybitClient};
use perp_agent_core::{AccountType, ExchangeClient, KlineInterval, OrderSide};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": result,
        "time": 1_700_000_000_000_i64
    }))
}

fn rejected(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "retCode": code,
        "retMsg": message,
        "result": {},
        "time": 1_700_000_000_000_i64
    }))
}

fn client(server: &MockServer) -> BybitClient {
    BybitClient::new(server.uri()).with_credentials("test-key", "test-secret")
}

#[tokio::test]
async fn ticker_returns_last_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .and(query_param("category", "linear"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ok(json!({
            "category": "linear",
            "list": [{"symbol": "BTCUSDT", "lastPrice": "65000.50", "markPrice": "65001.00"}]
        })))
        .mount(&server)
        .await;

    let ticker = client(&server).get_ticker("BTCUSDT").await.unwrap();
    assert_eq!(ticker.symbol, "BTCUSDT");
    assert_eq!(ticker.last_price, dec!(65000.50));
}

#[tokio::test]
async fn empty_ticker_list_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ok(json!({"category": "linear", "list": []})))
        .mount(&server)
        .await;

    assert!(client(&server).get_ticker("BTCUSDT").await.is_err());
}

#[tokio::test]
async fn klines_are_requested_by_interval_and_returned_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .and(query_param("interval", "5"))
        .and(query_param("limit", "200"))
        .respond_with(ok(json!({
            "symbol": "BTCUSDT",
            "category": "linear",
            "list": [
                ["1700000300000", "64900", "65100", "64800", "65000", "10", "650000"],
                ["1700000000000", "64800", "64950", "64700", "64900", "12", "778800"]
            ]
        })))
        .mount(&server)
        .await;

    let klines = client(&server)
        .get_klines("BTCUSDT", KlineInterval::FiveMinutes, 200)
        .await
        .unwrap();
    assert_eq!(klines.len(), 2);
    assert!(klines[0].open_time < klines[1].open_time);
    assert_eq!(klines[1].close, dec!(65000));
}

#[tokio::test]
async fn balance_request_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/account/wallet-balance"))
        .and(query_param("accountType", "UNIFIED"))
        .and(header_exists("X-BAPI-API-KEY"))
        .and(header_exists("X-BAPI-SIGN"))
        .and(header_exists("X-BAPI-TIMESTAMP"))
        .and(header_exists("X-BAPI-RECV-WINDOW"))
        .respond_with(ok(json!({
            "list": [{
                "accountType": "UNIFIED",
                "coin": [{"coin": "USDT", "walletBalance": "1234.5", "availableToWithdraw": "1200"}]
            }]
        })))
        .mount(&server)
        .await;

    let balances = client(&server)
        .get_balance(AccountType::Unified)
        .await
        .unwrap();
    assert_eq!(balances["USDT"], dec!(1200));
}

#[tokio::test]
async fn balance_without_credentials_fails_before_sending() {
    let server = MockServer::start().await;
    let unauthenticated = BybitClient::new(server.uri());
    assert!(unauthenticated.get_balance(AccountType::Unified).await.is_err());
}

#[tokio::test]
async fn order_book_levels_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/orderbook"))
        .and(query_param("limit", "50"))
        .respond_with(ok(json!({
            "s": "BTCUSDT",
            "a": [["65001", "1.5"], ["65002", "0.5"]],
            "b": [["64999", "3"]],
            "ts": 1_700_000_000_000_i64,
            "u": 1
        })))
        .mount(&server)
        .await;

    let book = client(&server).get_order_book("BTCUSDT", 50).await.unwrap();
    assert_eq!(book.asks.len(), 2);
    assert_eq!(book.average_depth(), dec!(2.5));
}

#[tokio::test]
async fn set_leverage_sends_both_sides() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/position/set-leverage"))
        .and(header_exists("X-BAPI-SIGN"))
        .and(body_json(json!({
            "category": "linear",
            "symbol": "BTCUSDT",
            "buyLeverage": "75",
            "sellLeverage": "75"
        })))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).set_leverage("BTCUSDT", 75, 75).await.unwrap();
}

#[tokio::test]
async fn unchanged_leverage_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/position/set-leverage"))
        .respond_with(rejected(110_043, "leverage not modified"))
        .mount(&server)
        .await;

    assert!(client(&server).set_leverage("BTCUSDT", 75, 75).await.is_ok());
}

#[tokio::test]
async fn rejected_leverage_carries_exchange_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/position/set-leverage"))
        .respond_with(rejected(110_013, "cannot set leverage due to risk limit level"))
        .mount(&server)
        .await;

    let err = client(&server)
        .set_leverage("BTCUSDT", 150, 150)
        .await
        .unwrap_err();
    let api = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api.code, 110_013);
    assert!(err.to_string().contains("risk limit"));
}

#[tokio::test]
async fn market_order_is_submitted_with_three_decimal_qty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/order/create"))
        .and(body_json(json!({
            "category": "linear",
            "symbol": "BTCUSDT",
            "side": "Buy",
            "orderType": "Market",
            "qty": "0.092"
        })))
        .respond_with(ok(json!({"orderId": "abc-123", "orderLinkId": ""})))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server)
        .place_market_order("BTCUSDT", OrderSide::Buy, dec!(0.092))
        .await
        .unwrap();
    assert_eq!(ack.order_id, "abc-123");
}

#[tokio::test]
async fn rejected_order_surfaces_ret_msg() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v5/order/create"))
        .respond_with(rejected(110_007, "ab not enough for new order"))
        .mount(&server)
        .await;

    let err = client(&server)
        .place_market_order("BTCUSDT", OrderSide::Sell, dec!(0.5))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bybit API error 110007: ab not enough for new order");
}

#[tokio::test]
async fn http_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).get_ticker("BTCUSDT").await.unwrap_err();
    assert!(err.to_string().contains("503"));
}
