use std::sync::Arc;

use async_trait::async_trait;
use zarela_core::config::Config;
use zarela_core::domain::{Address, ContentHash, OrderId};
use zarela_core::error::{Result, ZarelaError};
use zarela_core::payload::{Payload, PayoutOutcome, PayoutSink, build_payload, submit_payout};
use zarela_core::retrieve::http::{HttpGateway, RpcDecryptor};
use zarela_core::retrieve::{DirSaveTarget, RetrievalBoard, RetrievalPipeline, retrieve_many};
use zarela_core::selection::{GroupState, SelectionStore, Toggle};
use zarela_core::source::JsonFileSource;
use zarela_core::view::OrderView;

use crate::presentation::cli::SelectionArgs;

fn require_account(cfg: &Config) -> Result<Address> {
    cfg.account
        .clone()
        .ok_or_else(|| ZarelaError::Format("no account configured; pass --account".into()))
}

fn parse_file_ref(s: &str) -> Result<(Address, ContentHash)> {
    let (a, h) = s
        .split_once(':')
        .ok_or_else(|| ZarelaError::Format(format!("expected ADDR:HASH, got {s}")))?;
    Ok((Address::parse(a)?, ContentHash::parse(h)?))
}

pub fn apply_selection(store: &mut SelectionStore, args: &SelectionArgs) -> Result<()> {
    if args.all {
        store.toggle_all(Toggle::Select);
    }
    for g in &args.groups {
        store.toggle_group(&Address::parse(g)?, Toggle::Select);
    }
    for f in &args.files {
        let (a, h) = parse_file_ref(f)?;
        store.toggle_file(&a, &h, Toggle::Select);
    }
    for g in &args.deselect_groups {
        store.toggle_group(&Address::parse(g)?, Toggle::Deselect);
    }
    for f in &args.deselect_files {
        let (a, h) = parse_file_ref(f)?;
        store.toggle_file(&a, &h, Toggle::Deselect);
    }
    Ok(())
}

async fn open_view(cfg: &Config, order: OrderId) -> Result<OrderView> {
    let caller = require_account(cfg)?;
    let source = JsonFileSource::new(&cfg.orders_dir);
    let mut view = OrderView::new(order);
    view.load(&source, &caller).await;
    Ok(view)
}

async fn selected_store(
    cfg: &Config,
    order: OrderId,
    args: &SelectionArgs,
) -> Result<SelectionStore> {
    let view = open_view(cfg, order).await?;
    let mut store = view.store().cloned().unwrap_or_default();
    apply_selection(&mut store, args)?;
    Ok(store)
}

fn mark(state: GroupState) -> &'static str {
    match state {
        GroupState::None => "[ ]",
        GroupState::Partial => "[-]",
        GroupState::All => "[x]",
    }
}

fn print_selection(store: &SelectionStore) {
    for (address, files) in store.group().iter() {
        println!("{} {address}", mark(store.group_state(address)));
        for f in files {
            let tick = if store.is_selected(address, &f.content_hash) { "x" } else { " " };
            println!("    [{tick}] {}  {}", f.content_hash, f.timestamp.to_rfc3339());
        }
    }
    println!(
        "selected {} of {} files{}",
        store.selected_count(),
        store.group().file_count(),
        if store.is_all_selected() { " (all)" } else { "" }
    );
}

pub async fn handle_files(cfg: &Config, order: OrderId) -> Result<()> {
    let view = open_view(cfg, order).await?;
    let Some(store) = view.store() else {
        return Ok(());
    };
    let group = store.group();
    println!(
        "order {order}: {} contributors, {} files",
        group.len(),
        group.file_count()
    );
    for (address, files) in group.iter() {
        println!("{address}  ({} files)", files.len());
        for f in files {
            println!("    {}  {}", f.content_hash, f.timestamp.to_rfc3339());
        }
    }
    Ok(())
}

pub async fn handle_payload(cfg: &Config, order: OrderId, args: &SelectionArgs) -> Result<()> {
    let store = selected_store(cfg, order, args).await?;
    print_selection(&store);
    let payload = build_payload(store.state());
    if payload.is_empty() {
        eprintln!("payload: empty; payout would be skipped");
    }
    println!("{}", serde_json::to_string(&payload)?);
    Ok(())
}

/// Prints the payout request as JSON instead of sending a transaction.
struct StdoutPayout;

#[async_trait]
impl PayoutSink for StdoutPayout {
    async fn confirm(&self, order: OrderId, payload: &Payload) -> Result<()> {
        let req = serde_json::json!({ "order": order, "addresses": payload });
        println!("{}", serde_json::to_string_pretty(&req)?);
        Ok(())
    }
}

pub async fn handle_confirm(cfg: &Config, order: OrderId, args: &SelectionArgs) -> Result<()> {
    let store = selected_store(cfg, order, args).await?;
    match submit_payout(&StdoutPayout, order, store.state()).await? {
        PayoutOutcome::Submitted { entries } => eprintln!("confirm: {entries} payout entries"),
        PayoutOutcome::Skipped => eprintln!("confirm: nothing selected, skipped"),
    }
    Ok(())
}

pub async fn handle_retrieve(cfg: &Config, hashes: &[String], limit: Option<usize>) -> Result<()> {
    let account = require_account(cfg)?;
    let hashes = hashes
        .iter()
        .map(|h| ContentHash::parse(h))
        .collect::<Result<Vec<_>>>()?;

    let pipeline = RetrievalPipeline::new(
        Arc::new(HttpGateway::new(cfg.gateway_url.clone())),
        Arc::new(RpcDecryptor::new(cfg.rpc_url.clone())),
        Arc::new(DirSaveTarget::new(cfg.download_dir.clone())),
    );
    let board = RetrievalBoard::new();
    let limit = limit.unwrap_or(cfg.max_concurrent);

    let outcomes = retrieve_many(&board, &pipeline, &hashes, &account, limit).await;
    let mut failed = 0usize;
    for (hash, outcome) in &outcomes {
        match outcome {
            Ok(r) => println!(
                "{hash}  ok  {}  {}  {} bytes  blake3={}",
                r.path.display(),
                r.mime,
                r.bytes,
                r.blake3
            ),
            Err(f) => {
                failed += 1;
                println!("{hash}  failed  {f}");
            }
        }
    }
    if failed > 0 {
        return Err(ZarelaError::Format(format!(
            "{failed} of {} retrievals failed",
            outcomes.len()
        )));
    }
    Ok(())
}
