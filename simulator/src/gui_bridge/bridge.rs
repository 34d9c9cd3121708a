use crate::workflow::session::{lock, SharedSession};
use firewatch_core::{ConsoleError, ConsoleEvent, Effect};
use log::{error, info, warn};
use serde_json::json;
use std::net::SocketAddr;
use std::thread;
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

const MAX_EVENT_BYTES: u64 = 16 * 1024;

/// Bridge that hosts the console HTTP endpoint for the visualizer.
pub struct GuiBridge {
    session: SharedSession,
}

impl GuiBridge {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    /// Serves the routes on a dedicated thread with its own runtime.
    pub fn spawn(&self, addr: SocketAddr) -> thread::JoinHandle<()> {
        let routes = routes(self.session.clone());
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            info!("bridge listening on http://{}", addr);
            runtime.block_on(async move {
                warp::serve(routes).run(addr).await;
            });
        })
    }

    pub fn publish_status(&self, message: &str) {
        lock(&self.session).push_activity(message.to_string());
        println!("[GUI] {}", message);
    }
}

pub fn routes(
    session: SharedSession,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let session_filter = warp::any().map(move || session.clone());

    let snapshot_route = warp::path("snapshot")
        .and(warp::path::end())
        .and(warp::get())
        .and(session_filter.clone())
        .map(|session: SharedSession| warp::reply::json(&lock(&session).model()));

    let event_route = warp::path("event")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_EVENT_BYTES))
        .and(warp::body::json())
        .and(session_filter.clone())
        .map(|event: ConsoleEvent, session: SharedSession| {
            if event.is_timer_only() {
                warn!("rejected timer-only event from client: {:?}", event);
                return warp::reply::with_status(
                    warp::reply::json(&json!({ "error": "event is raised by the bridge timer" })),
                    StatusCode::BAD_REQUEST,
                );
            }
            let effects = dispatch_and_schedule(&session, event);
            warp::reply::with_status(warp::reply::json(&effects), StatusCode::OK)
        });

    let export_route = warp::path!("export" / String)
        .and(warp::get())
        .and(session_filter.clone())
        .map(|id: String, session: SharedSession| {
            match lock(&session).console_mut().export_incident(&id) {
                Ok(export) => warp::reply::with_status(
                    warp::reply::json(&export),
                    StatusCode::OK,
                ),
                Err(err) => {
                    warn!("export {} failed: {}", id, err);
                    let status = match err {
                        ConsoleError::NotFound(_) => StatusCode::NOT_FOUND,
                        ConsoleError::ExportUnavailable(_) => StatusCode::CONFLICT,
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    };
                    warp::reply::with_status(
                        warp::reply::json(&json!({ "error": err.to_string() })),
                        status,
                    )
                }
            }
        });

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(session_filter)
        .map(|session: SharedSession| {
            warp::reply::json(&lock(&session).console().metrics().snapshot())
        });

    snapshot_route
        .or(event_route)
        .or(export_route)
        .or(metrics_route)
}

/// Dispatches an event and arms a timer for every scheduled analysis.
/// Each timer completes only the run that armed it.
fn dispatch_and_schedule(session: &SharedSession, event: ConsoleEvent) -> Vec<Effect> {
    let effects = lock(session).dispatch(event);
    for (run, delay) in effects.iter().filter_map(Effect::scheduled_analysis) {
        let session = session.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&session).dispatch(ConsoleEvent::AnalysisComplete { run });
        });
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui_bridge::model::VisualizationModel;
    use crate::workflow::config::SimulatorConfig;
    use crate::workflow::session::{build_console, shared, Session};
    use firewatch_core::geo::LatLng;
    use firewatch_core::prelude::DelayWindow;
    use std::time::Duration;

    fn session_with_delay(min_ms: u64, max_ms: u64) -> SharedSession {
        let mut config = SimulatorConfig {
            seed: Some(5),
            ..Default::default()
        };
        config.console.analysis_delay_ms = DelayWindow { min_ms, max_ms };
        shared(Session::new(build_console(&config).unwrap()))
    }

    fn fast_session() -> SharedSession {
        session_with_delay(1, 5)
    }

    fn select_area() -> ConsoleEvent {
        ConsoleEvent::SelectBounds {
            corner_a: LatLng::new(38.0, 23.6),
            corner_b: LatLng::new(38.2, 23.9),
        }
    }

    async fn post<F>(filter: &F, event: &ConsoleEvent) -> u16
    where
        F: Filter + 'static,
        F::Extract: warp::Reply + Send,
    {
        warp::test::request()
            .method("POST")
            .path("/event")
            .json(event)
            .reply(filter)
            .await
            .status()
            .as_u16()
    }

    #[tokio::test]
    async fn run_detection_completes_after_timer() {
        let session = fast_session();
        let filter = routes(session.clone());

        assert_eq!(post(&filter, &select_area()).await, 200);
        assert_eq!(post(&filter, &ConsoleEvent::RunDetection).await, 200);
        assert!(lock(&session).console().is_analysis_pending());

        tokio::time::sleep(Duration::from_millis(50)).await;

        let response = warp::test::request()
            .method("GET")
            .path("/snapshot")
            .reply(&filter)
            .await;
        assert_eq!(response.status(), 200);
        let model: VisualizationModel = serde_json::from_slice(response.body()).unwrap();
        assert!(!model.snapshot.analysis_pending);
        assert!(model.snapshot.review_pending());
        assert_eq!(model.layers.markers.len(), 1);
    }

    #[tokio::test]
    async fn clients_cannot_complete_an_analysis() {
        let session = session_with_delay(400, 401);
        let filter = routes(session.clone());

        assert_eq!(post(&filter, &select_area()).await, 200);
        assert_eq!(post(&filter, &ConsoleEvent::RunDetection).await, 200);
        let run = lock(&session).console().pending_run().unwrap();

        assert_eq!(
            post(&filter, &ConsoleEvent::AnalysisComplete { run }).await,
            400
        );
        let guard = lock(&session);
        assert!(guard.console().is_analysis_pending());
        assert!(guard.console().detection().is_none());
    }

    #[tokio::test]
    async fn leftover_timer_does_not_complete_the_next_run() {
        let session = session_with_delay(400, 401);
        let filter = routes(session.clone());

        assert_eq!(post(&filter, &select_area()).await, 200);
        assert_eq!(post(&filter, &ConsoleEvent::RunDetection).await, 200);
        {
            // finish the first run early so its timer is still armed
            let mut guard = lock(&session);
            let run = guard.console().pending_run().unwrap();
            guard.dispatch(ConsoleEvent::AnalysisComplete { run });
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(post(&filter, &ConsoleEvent::RunDetection).await, 200);

        // the first timer fires about 100ms into the second run
        tokio::time::sleep(Duration::from_millis(150)).await;
        {
            let guard = lock(&session);
            assert!(guard.console().is_analysis_pending());
            assert_eq!(guard.console().metrics().snapshot().detections, 1);
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        let guard = lock(&session);
        assert!(!guard.console().is_analysis_pending());
        assert_eq!(guard.console().metrics().snapshot().detections, 2);
    }

    #[tokio::test]
    async fn export_of_unknown_incident_is_not_found() {
        let filter = routes(fast_session());
        let response = warp::test::request()
            .method("GET")
            .path("/export/WF-404")
            .reply(&filter)
            .await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn confirmed_incident_is_exported_over_http() {
        let session = fast_session();
        {
            let mut guard = lock(&session);
            guard.dispatch(select_area());
            guard.dispatch(ConsoleEvent::RunDetection);
            let run = guard.console().pending_run().unwrap();
            guard.dispatch(ConsoleEvent::AnalysisComplete { run });
        }
        let id = lock(&session)
            .console()
            .detection()
            .map(|detection| detection.id().to_string())
            .unwrap();
        let filter = routes(session.clone());
        assert_eq!(
            post(
                &filter,
                &ConsoleEvent::Confirm {
                    detection_id: id.clone()
                }
            )
            .await,
            200
        );

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/export/{}", id))
            .reply(&filter)
            .await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["incidentId"], id.as_str());
        assert_eq!(body["incidentStatus"], "Confirmed Wildfire");

        let metrics = warp::test::request()
            .method("GET")
            .path("/metrics")
            .reply(&filter)
            .await;
        let counters: serde_json::Value = serde_json::from_slice(metrics.body()).unwrap();
        assert_eq!(counters["confirmed"], 1);
    }
}
