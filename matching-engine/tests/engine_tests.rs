use std::sync::Arc;
use std::time::Duration;

use common::decimal::{dec, Amount};
use common::model::currency::{Currency, CurrencyPair};
use common::model::order::Side;
use ledger_service::LedgerService;
use matching_engine::MatchingEngine;
use uuid::Uuid;

fn funded_client(ledger: &LedgerService, currency: Currency, amount: Amount) -> Uuid {
    let client = Uuid::new_v4();
    ledger.deposit(client, currency, amount);
    client
}

#[tokio::test]
async fn unmatched_order_rests_in_the_book() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let buyer = funded_client(&ledger, Currency::RUB, dec!(1000));
    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(15), dec!(66.66))
        .unwrap();
    engine.submit(bid).await.unwrap();

    assert_eq!(engine.all_orders().len(), 1);
    assert_eq!(ledger.balance(buyer, Currency::RUB), dec!(0.10));
}

#[tokio::test]
async fn crossing_orders_fill_completely() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let buyer = funded_client(&ledger, Currency::RUB, dec!(1000));
    let seller = funded_client(&ledger, Currency::USD, dec!(15));

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(15), dec!(66.66))
        .unwrap();
    engine.submit(bid).await.unwrap();

    let ask = ledger
        .open_order(seller, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(ask).await.unwrap();

    // The incoming sell deals at the resting bid's 66.66
    assert!(engine.all_orders().is_empty());
    assert_eq!(ledger.balance(buyer, Currency::USD), dec!(15));
    assert_eq!(ledger.balance(seller, Currency::RUB), dec!(999.90));
}

#[tokio::test]
async fn resting_sell_sets_the_deal_price_for_an_incoming_buy() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let seller = funded_client(&ledger, Currency::USD, dec!(15));
    let buyer = funded_client(&ledger, Currency::RUB, dec!(1000));

    let ask = ledger
        .open_order(seller, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(ask).await.unwrap();

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(15), dec!(66.66))
        .unwrap();
    engine.submit(bid).await.unwrap();

    // Deal executes at 65; the unspent escrow flows back to the buyer
    assert!(engine.all_orders().is_empty());
    assert_eq!(ledger.balance(seller, Currency::RUB), dec!(975));
    assert_eq!(ledger.balance(buyer, Currency::USD), dec!(15));
    assert_eq!(ledger.balance(buyer, Currency::RUB), dec!(25));
}

#[tokio::test]
async fn incoming_buy_sweeps_both_resting_sells() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let first_seller = funded_client(&ledger, Currency::USD, dec!(15));
    let second_seller = funded_client(&ledger, Currency::USD, dec!(25));
    let buyer = funded_client(&ledger, Currency::RUB, dec!(10000));

    let first_ask = ledger
        .open_order(first_seller, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(first_ask).await.unwrap();

    let second_ask = ledger
        .open_order(second_seller, CurrencyPair::UsdRub, Side::Sell, dec!(25), dec!(70))
        .unwrap();
    engine.submit(second_ask).await.unwrap();

    assert_eq!(engine.all_orders().len(), 2);

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(40), dec!(80))
        .unwrap();
    engine.submit(bid).await.unwrap();

    assert!(engine.all_orders().is_empty());
    assert_eq!(ledger.balance(first_seller, Currency::RUB), dec!(975));
    assert_eq!(ledger.balance(second_seller, Currency::RUB), dec!(1750));
    assert_eq!(ledger.balance(buyer, Currency::USD), dec!(40));
    assert_eq!(ledger.balance(buyer, Currency::RUB), dec!(7275));
}

#[tokio::test]
async fn incoming_buy_partially_fills_the_second_sell() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let first_seller = funded_client(&ledger, Currency::USD, dec!(15));
    let second_seller = funded_client(&ledger, Currency::USD, dec!(25));
    let buyer = funded_client(&ledger, Currency::RUB, dec!(10000));

    let first_ask = ledger
        .open_order(first_seller, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(first_ask).await.unwrap();

    let second_ask = ledger
        .open_order(second_seller, CurrencyPair::UsdRub, Side::Sell, dec!(25), dec!(70))
        .unwrap();
    engine.submit(second_ask).await.unwrap();

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(25), dec!(80))
        .unwrap();
    engine.submit(bid).await.unwrap();

    let remaining = engine.all_orders();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].client, second_seller);
    assert_eq!(remaining[0].remaining, dec!(15));
    assert_eq!(remaining[0].price, dec!(70));

    assert_eq!(ledger.balance(first_seller, Currency::RUB), dec!(975));
    assert_eq!(ledger.balance(second_seller, Currency::RUB), dec!(700));
    assert_eq!(ledger.balance(buyer, Currency::USD), dec!(25));
    assert_eq!(ledger.balance(buyer, Currency::RUB), dec!(8325));
}

#[tokio::test]
async fn orders_that_do_not_cross_both_rest() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let seller = funded_client(&ledger, Currency::USD, dec!(15));
    let buyer = funded_client(&ledger, Currency::RUB, dec!(10000));

    let ask = ledger
        .open_order(seller, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(ask).await.unwrap();

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(25), dec!(60))
        .unwrap();
    engine.submit(bid).await.unwrap();

    assert_eq!(engine.all_orders().len(), 2);
}

#[tokio::test]
async fn revoke_all_refunds_resting_orders() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let first_seller = funded_client(&ledger, Currency::USD, dec!(15));
    let second_seller = funded_client(&ledger, Currency::USD, dec!(25));

    let first_ask = ledger
        .open_order(first_seller, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(first_ask).await.unwrap();

    let second_ask = ledger
        .open_order(second_seller, CurrencyPair::UsdRub, Side::Sell, dec!(25), dec!(70))
        .unwrap();
    engine.submit(second_ask).await.unwrap();

    engine.revoke_all();

    assert!(engine.all_orders().is_empty());
    assert_eq!(ledger.balance(first_seller, Currency::USD), dec!(15));
    assert_eq!(ledger.balance(second_seller, Currency::USD), dec!(25));
}

#[tokio::test]
async fn same_client_orders_never_match() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let client = Uuid::new_v4();
    ledger.deposit(client, Currency::USD, dec!(15));
    ledger.deposit(client, Currency::RUB, dec!(2000));

    let ask = ledger
        .open_order(client, CurrencyPair::UsdRub, Side::Sell, dec!(15), dec!(65))
        .unwrap();
    engine.submit(ask).await.unwrap();

    // Crosses the client's own sell on price, but self-trades are filtered
    let bid = ledger
        .open_order(client, CurrencyPair::UsdRub, Side::Buy, dec!(15), dec!(70))
        .unwrap();
    engine.submit(bid).await.unwrap();

    assert_eq!(engine.all_orders().len(), 2);
    assert_eq!(ledger.balance(client, Currency::USD), Amount::ZERO);
    assert_eq!(ledger.balance(client, Currency::RUB), dec!(950));
}

#[tokio::test]
async fn equal_prices_fill_in_admission_order() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let first_seller = funded_client(&ledger, Currency::USD, dec!(10));
    let second_seller = funded_client(&ledger, Currency::USD, dec!(10));
    let buyer = funded_client(&ledger, Currency::RUB, dec!(650));

    let first_ask = ledger
        .open_order(first_seller, CurrencyPair::UsdRub, Side::Sell, dec!(10), dec!(65))
        .unwrap();
    engine.submit(first_ask).await.unwrap();

    let second_ask = ledger
        .open_order(second_seller, CurrencyPair::UsdRub, Side::Sell, dec!(10), dec!(65))
        .unwrap();
    engine.submit(second_ask).await.unwrap();

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(10), dec!(65))
        .unwrap();
    engine.submit(bid).await.unwrap();

    assert_eq!(ledger.balance(first_seller, Currency::RUB), dec!(650));
    assert_eq!(ledger.balance(second_seller, Currency::RUB), Amount::ZERO);

    let remaining = engine.all_orders();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].client, second_seller);
}

#[tokio::test]
async fn detached_submission_is_still_processed() {
    let ledger = Arc::new(LedgerService::new());
    let engine = MatchingEngine::new(ledger.clone());

    let buyer = funded_client(&ledger, Currency::RUB, dec!(650));
    let seller = funded_client(&ledger, Currency::USD, dec!(10));

    let bid = ledger
        .open_order(buyer, CurrencyPair::UsdRub, Side::Buy, dec!(10), dec!(65))
        .unwrap();

    // Give up waiting immediately. The submission is enqueued before the
    // first await point, so the order stays in the pipeline.
    let _ = tokio::time::timeout(Duration::from_millis(0), engine.submit(bid)).await;

    // FIFO per instrument: by the time this sell completes, the detached
    // buy has been through its cycle and rests in the book to match it.
    let ask = ledger
        .open_order(seller, CurrencyPair::UsdRub, Side::Sell, dec!(10), dec!(65))
        .unwrap();
    engine.submit(ask).await.unwrap();

    assert!(engine.all_orders().is_empty());
    assert_eq!(ledger.balance(buyer, Currency::USD), dec!(10));
    assert_eq!(ledger.balance(seller, Currency::RUB), dec!(650));
}

#[tokio::test]
async fn instruments_match_independently() {
    let ledger = Arc::new(LedgerService::new());
    let engine = Arc::new(MatchingEngine::new(ledger.clone()));

    let usd_seller = funded_client(&ledger, Currency::USD, dec!(10));
    let eur_seller = funded_client(&ledger, Currency::EUR, dec!(10));

    let usd_ask = ledger
        .open_order(usd_seller, CurrencyPair::UsdRub, Side::Sell, dec!(10), dec!(65))
        .unwrap();
    let eur_ask = ledger
        .open_order(eur_seller, CurrencyPair::EurRub, Side::Sell, dec!(10), dec!(90))
        .unwrap();

    let (first, second) = tokio::join!(engine.submit(usd_ask), engine.submit(eur_ask));
    first.unwrap();
    second.unwrap();

    // Opposite instruments never see each other's orders
    assert_eq!(engine.all_orders().len(), 2);
}
