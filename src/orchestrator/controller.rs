//! Catalog controller loop.
//!
//! Owns the coordinator, reacts to UI commands, debounce deadlines and fetch
//! completions, and publishes view snapshots for presentation layers.

use super::coordinator::{Coordinator, FetchOutcome};
use crate::error::CatalogError;
use crate::model::{CatalogEvent, InfoEvent, PokemonDetail};
use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Duration;
use tracing::debug;

/// Commands emitted by UI layers to drive the catalog.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// Raw contents of the search box after a keystroke.
    Search(String),
    NextPage,
    PrevPage,
    Refresh,
    Detail(u32),
    Quit,
}

enum TaskOutput {
    Query(FetchOutcome),
    Detail(u32, Result<PokemonDetail, CatalogError>),
}

type Tasks = FuturesUnordered<BoxFuture<'static, TaskOutput>>;

/// Start the fetch the current view needs (if any) and publish a snapshot.
fn publish(coord: &mut Coordinator, tasks: &mut Tasks, event_tx: &UnboundedSender<CatalogEvent>) {
    if let Some(key) = coord.required_fetch() {
        tasks.push(coord.start(key).map(TaskOutput::Query).boxed());
    }
    let _ = event_tx.send(CatalogEvent::View(coord.view()));
}

fn request_detail(
    coord: &mut Coordinator,
    tasks: &mut Tasks,
    event_tx: &UnboundedSender<CatalogEvent>,
    id: u32,
) {
    if let Some(d) = coord.cached_detail(&id.to_string()) {
        let _ = event_tx.send(CatalogEvent::Detail {
            id,
            result: Box::new(Ok((*d).clone())),
        });
        return;
    }
    let fut = coord.detail_future(&id.to_string());
    tasks.push(fut.map(move |r| TaskOutput::Detail(id, r)).boxed());
}

/// Drive the catalog until the UI quits or drops its command channel.
///
/// Everything runs on this one task: fetch futures are polled here rather
/// than spawned, so the coordinator is never shared.
pub(crate) async fn run_controller(
    mut coord: Coordinator,
    event_tx: UnboundedSender<CatalogEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut tasks: Tasks = FuturesUnordered::new();
    let mut housekeeping = tokio::time::interval(Duration::from_secs(30));

    publish(&mut coord, &mut tasks, &event_tx);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Search(raw)) => {
                        coord.set_search_term(raw);
                        let _ = event_tx.send(CatalogEvent::View(coord.view()));
                    }
                    Some(UiCommand::NextPage) => {
                        coord.next_page();
                        publish(&mut coord, &mut tasks, &event_tx);
                    }
                    Some(UiCommand::PrevPage) => {
                        coord.prev_page();
                        publish(&mut coord, &mut tasks, &event_tx);
                    }
                    Some(UiCommand::Refresh) => {
                        coord.refresh();
                        publish(&mut coord, &mut tasks, &event_tx);
                    }
                    Some(UiCommand::Detail(id)) => {
                        request_detail(&mut coord, &mut tasks, &event_tx, id);
                    }
                    // In-flight fetches are dropped with the task set.
                    Some(UiCommand::Quit) | None => break Ok(()),
                }
            }
            term = coord.next_commit() => {
                debug!(%term, "search term committed");
                let committed = InfoEvent::TermCommitted { term: term.clone() };
                let _ = event_tx.send(CatalogEvent::Info(committed));
                coord.commit_term(term);
                publish(&mut coord, &mut tasks, &event_tx);
            }
            Some(done) = tasks.next() => {
                match done {
                    TaskOutput::Query(outcome) => {
                        coord.apply(outcome);
                        publish(&mut coord, &mut tasks, &event_tx);
                    }
                    TaskOutput::Detail(id, res) => {
                        let result = match res {
                            Ok(d) => Ok((*coord.store_detail(d)).clone()),
                            Err(e) => {
                                let _ = event_tx.send(CatalogEvent::Info(InfoEvent::FetchFailed {
                                    what: format!("Pokémon #{id}"),
                                    message: e.to_string(),
                                }));
                                Err(e.to_string())
                            }
                        };
                        let result = Box::new(result);
                        let _ = event_tx.send(CatalogEvent::Detail { id, result });
                    }
                }
            }
            _ = housekeeping.tick() => coord.evict_expired(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogConfig, Mode, PageStatus, PageView};
    use crate::source::fake::FakeSource;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn next_view(rx: &mut UnboundedReceiver<CatalogEvent>) -> PageView {
        loop {
            match rx.recv().await {
                Some(CatalogEvent::View(v)) => return v,
                Some(_) => continue,
                None => panic!("controller hung up"),
            }
        }
    }

    async fn next_settled_view(rx: &mut UnboundedReceiver<CatalogEvent>) -> PageView {
        loop {
            let v = next_view(rx).await;
            if v.status != PageStatus::Loading {
                return v;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn typing_commits_once_and_switches_to_search() {
        let src = FakeSource::with_count(45).named(25, "pikachu");
        let coord = Coordinator::new(Arc::new(src.clone()), &CatalogConfig::default());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(coord, event_tx, cmd_rx));

        let first = next_settled_view(&mut event_rx).await;
        assert_eq!(first.mode, Mode::Browse);
        assert_eq!(first.items.len(), 20);

        cmd_tx.send(UiCommand::NextPage).unwrap();
        let second = next_settled_view(&mut event_rx).await;
        assert_eq!(second.page, 1);

        cmd_tx.send(UiCommand::Search("p".into())).unwrap();
        let typed = next_view(&mut event_rx).await;
        assert_eq!(typed.raw_term, "p");
        assert!(typed.search_pending);
        assert_eq!(typed.mode, Mode::Browse);
        assert_eq!(typed.page, 1);

        for raw in ["pi", "pik"] {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cmd_tx.send(UiCommand::Search(raw.into())).unwrap();
        }
        let searched = loop {
            let v = next_settled_view(&mut event_rx).await;
            if v.mode == Mode::Search {
                break v;
            }
            assert!(v.search_pending);
        };
        assert!(!searched.search_pending);
        assert_eq!(searched.raw_term, "pik");
        assert_eq!(searched.term, "pik");
        assert_eq!(searched.page, 0);
        assert_eq!(searched.items.len(), 1);
        assert_eq!(searched.items[0].id, 25);

        // browse page 0 + browse page 1 + one name index
        assert_eq!(src.listing_calls(), 3);

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn detail_requests_are_answered() {
        let src = FakeSource::with_count(10).named(4, "charmander");
        let coord = Coordinator::new(Arc::new(src), &CatalogConfig::default());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(coord, event_tx, cmd_rx));

        cmd_tx.send(UiCommand::Detail(4)).unwrap();
        let detail = loop {
            if let Some(CatalogEvent::Detail { id, result }) = event_rx.recv().await {
                assert_eq!(id, 4);
                break *result;
            }
        };
        assert_eq!(detail.unwrap().name, "charmander");

        drop(cmd_tx);
        handle.await.unwrap().unwrap();
    }
}
