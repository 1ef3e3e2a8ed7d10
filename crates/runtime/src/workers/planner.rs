//! AI planning worker.
//!
//! Plans run on the blocking pool against a decoded snapshot, so a long
//! search never stalls the battle worker. Each request carries the snapshot
//! it was made from; the caller revalidates the answer before applying it.
//!
//! A requester that stops waiting drops its reply receiver and sets the
//! request's cancel flag: queued requests are then skipped and a running
//! search stops at its next candidate.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use battle_core::{Battle, PcgRng, ShipId};

use crate::planner::{Cancelled, ScoredManeuver, TacticalPlanner};

/// One planning request.
pub struct PlanRequest {
    pub request_id: u64,
    /// Bincode encoded battle.
    pub snapshot: Vec<u8>,
    /// Generator the live battle will draw from next.
    pub rng: PcgRng,
    pub ship: ShipId,
    /// Set by the requester when it no longer wants the answer.
    pub cancel: Arc<AtomicBool>,
    pub reply: oneshot::Sender<PlanResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanResponse {
    Maneuver(ScoredManeuver),
    /// The ship is not playing in the snapshot.
    NoManeuver,
    /// The request could not be planned (bad snapshot, planner failure).
    Rejected(String),
}

/// Background task answering [`PlanRequest`]s in arrival order.
pub struct PlannerWorker {
    planner: TacticalPlanner,
    request_rx: mpsc::Receiver<PlanRequest>,
}

impl PlannerWorker {
    pub fn new(planner: TacticalPlanner, request_rx: mpsc::Receiver<PlanRequest>) -> Self {
        Self {
            planner,
            request_rx,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let PlanRequest {
                request_id,
                snapshot,
                rng,
                ship,
                cancel,
                reply,
            } = request;

            if reply.is_closed() || cancel.load(Ordering::Relaxed) {
                debug!(
                    target: "runtime::planner",
                    request_id,
                    ship = %ship,
                    "request abandoned, skipped"
                );
                continue;
            }

            let planner = self.planner.clone();
            let response = tokio::task::spawn_blocking(move || {
                plan_snapshot(&planner, &snapshot, ship, &rng, &cancel)
            })
            .await
            .unwrap_or_else(|err| PlanResponse::Rejected(format!("planner task failed: {err}")));

            debug!(target: "runtime::planner", request_id, ship = %ship, ?response, "plan ready");
            if reply.send(response).is_err() {
                debug!(target: "runtime::planner", request_id, "plan reply channel closed");
            }
        }
        debug!(target: "runtime::planner", "planner worker stopped");
    }
}

/// Decodes `snapshot` and plans for `ship`; panics and cancellation become
/// rejections.
fn plan_snapshot(
    planner: &TacticalPlanner,
    snapshot: &[u8],
    ship: ShipId,
    rng: &PcgRng,
    cancel: &AtomicBool,
) -> PlanResponse {
    let battle = match Battle::from_snapshot(snapshot) {
        Ok(battle) => battle,
        Err(err) => {
            warn!(target: "runtime::planner", ship = %ship, %err, "undecodable snapshot");
            return PlanResponse::Rejected(err.to_string());
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| {
        planner.plan_until(&battle, ship, rng, cancel)
    })) {
        Ok(Ok(Some(maneuver))) => PlanResponse::Maneuver(maneuver),
        Ok(Ok(None)) => PlanResponse::NoManeuver,
        Ok(Err(Cancelled)) => PlanResponse::Rejected(Cancelled.to_string()),
        Err(_) => {
            warn!(target: "runtime::planner", ship = %ship, "planner panicked");
            PlanResponse::Rejected("planner panicked".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::testing::{SHIP_A, SHIP_B, duel};

    async fn ask(
        tx: &mpsc::Sender<PlanRequest>,
        snapshot: Vec<u8>,
        rng: PcgRng,
        ship: ShipId,
    ) -> PlanResponse {
        let (reply, rx) = oneshot::channel();
        let request = PlanRequest {
            request_id: 1,
            snapshot,
            rng,
            ship,
            cancel: Arc::default(),
            reply,
        };
        assert!(tx.send(request).await.is_ok());
        rx.await.unwrap()
    }

    fn spawn() -> mpsc::Sender<PlanRequest> {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(PlannerWorker::new(TacticalPlanner::default(), rx).run());
        tx
    }

    #[tokio::test]
    async fn plans_match_direct_planning() {
        let (battle, rng) = duel();
        let tx = spawn();

        let response = ask(&tx, battle.to_snapshot().unwrap(), rng, SHIP_A).await;
        let expected = TacticalPlanner::default().plan(&battle, SHIP_A, &rng).unwrap();
        assert_eq!(response, PlanResponse::Maneuver(expected));
    }

    #[tokio::test]
    async fn waiting_ship_gets_no_maneuver() {
        let (battle, rng) = duel();
        let tx = spawn();
        let response = ask(&tx, battle.to_snapshot().unwrap(), rng, SHIP_B).await;
        assert_eq!(response, PlanResponse::NoManeuver);
    }

    #[tokio::test]
    async fn abandoned_requests_are_skipped() {
        let (battle, rng) = duel();
        let snapshot = battle.to_snapshot().unwrap();
        let tx = spawn();

        let (reply, rx) = oneshot::channel();
        drop(rx);
        let abandoned = PlanRequest {
            request_id: 0,
            snapshot: snapshot.clone(),
            rng,
            ship: SHIP_A,
            cancel: Arc::default(),
            reply,
        };
        assert!(tx.send(abandoned).await.is_ok());

        let response = ask(&tx, snapshot, rng, SHIP_A).await;
        assert!(matches!(response, PlanResponse::Maneuver(_)));
    }

    #[test]
    fn cancelled_plan_is_rejected() {
        let (battle, rng) = duel();
        let snapshot = battle.to_snapshot().unwrap();
        let response = plan_snapshot(
            &TacticalPlanner::default(),
            &snapshot,
            SHIP_A,
            &rng,
            &AtomicBool::new(true),
        );
        assert_eq!(response, PlanResponse::Rejected("planning cancelled".to_string()));
    }

    #[tokio::test]
    async fn garbage_snapshot_is_rejected() {
        let (_, rng) = duel();
        let tx = spawn();
        let response = ask(&tx, vec![0xff, 0x01], rng, SHIP_A).await;
        assert!(matches!(response, PlanResponse::Rejected(_)));
    }
}
