use firewatch_core::geo::{GeoBounds, LatLng};
use firewatch_core::impact::RiskTier;
use firewatch_core::lifecycle::{
    ConsoleSnapshot, DetectionState, DetectionView, IncidentView, LifecycleStatus, MapLayers,
    MarkerId, MarkerStyle,
};
use firewatch_core::ConsoleEvent;
use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Event, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Size, Subscription, Task,
    Theme,
};
use serde::Deserialize;
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";
const METRES_PER_DEGREE: f64 = 111_320.0;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Wildfire Operator Console".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_millis(500)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    payload: Option<VisualizationPayload>,
    viewport: Viewport,
    note: String,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    PayloadFetched(Result<VisualizationPayload, String>),
    AreaDrawn(LatLng, LatLng),
    ClearSelection,
    RunDetection,
    NoteChanged(String),
    Confirm(String),
    Reject(String),
    Focus(String),
    SetStatus(String, LifecycleStatus),
    Export(String),
    EventsPosted(Result<(), String>),
    Exported(Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                payload: None,
                viewport: Viewport::default(),
                note: String::new(),
                status: "Waiting for console bridge...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_payload(), Message::PayloadFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_payload(), Message::PayloadFetched),
            Message::PayloadFetched(Ok(payload)) => {
                if !payload.snapshot.review_pending() {
                    state.note.clear();
                }
                state.status = payload.status.clone();
                state.payload = Some(payload);
                Task::none()
            }
            Message::PayloadFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::AreaDrawn(corner_a, corner_b) => post(vec![ConsoleEvent::SelectBounds {
                corner_a,
                corner_b,
            }]),
            Message::ClearSelection => post(vec![ConsoleEvent::ClearSelection]),
            Message::RunDetection => {
                state.push_history("Detection run requested".into());
                post(vec![ConsoleEvent::RunDetection])
            }
            Message::NoteChanged(note) => {
                state.note = note;
                Task::none()
            }
            Message::Confirm(detection_id) => {
                state.push_history(format!("Confirmed {detection_id}"));
                post(vec![
                    ConsoleEvent::SetOperatorNote {
                        note: state.note.clone(),
                    },
                    ConsoleEvent::Confirm { detection_id },
                ])
            }
            Message::Reject(detection_id) => {
                state.push_history(format!("Rejected {detection_id}"));
                post(vec![ConsoleEvent::Reject { detection_id }])
            }
            Message::Focus(incident_id) => post(vec![ConsoleEvent::FocusIncident { incident_id }]),
            Message::SetStatus(incident_id, status) => {
                state.push_history(format!("{incident_id}: {}", status.label()));
                post(vec![ConsoleEvent::SetStatus {
                    incident_id,
                    status,
                }])
            }
            Message::Export(incident_id) => {
                Task::perform(export_incident(incident_id), Message::Exported)
            }
            Message::EventsPosted(Ok(())) => {
                Task::perform(fetch_payload(), Message::PayloadFetched)
            }
            Message::EventsPosted(Err(err)) => {
                state.status = format!("Event error: {err}");
                Task::none()
            }
            Message::Exported(Ok(path)) => {
                state.status = format!("Exported {path}");
                state.push_history(format!("Exported {path}"));
                Task::none()
            }
            Message::Exported(Err(err)) => {
                state.status = format!("Export error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let snapshot = state
            .payload
            .as_ref()
            .map(|payload| payload.snapshot.clone())
            .unwrap_or_default();
        let layers = state
            .payload
            .as_ref()
            .map(|payload| payload.layers.clone())
            .unwrap_or_default();

        let map = Canvas::new(MapView {
            viewport: state.viewport,
            layers,
            focused_marker: snapshot.focused_incident().map(|incident| incident.marker),
        })
        .width(Length::Fill)
        .height(Length::Fixed(520.0));

        let selection_info = match snapshot.selection {
            Some(bounds) => text(format!(
                "Selection: {:.4}..{:.4} N, {:.4}..{:.4} E",
                bounds.south, bounds.north, bounds.west, bounds.east
            )),
            None => text("Drag on the map to select an area"),
        }
        .size(14);

        let run_label = if snapshot.analysis_pending {
            "Analysing..."
        } else {
            "Run detection"
        };
        let controls = row![
            button(run_label)
                .on_press_maybe(snapshot.run_enabled.then_some(Message::RunDetection))
                .padding(10),
            button("Clear selection")
                .on_press_maybe(snapshot.selection.map(|_| Message::ClearSelection))
                .padding(10),
        ]
        .spacing(10);

        let review = review_panel(snapshot.detection.as_ref(), &state.note);
        let incidents = incident_list(&snapshot);
        let focused = focused_panel(&snapshot);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let console_column = column![
            text("Operator Console").size(26),
            text(&state.status).size(14),
            selection_info,
            controls,
            review,
            text("Incidents").size(18),
            Container::new(scrollable(incidents).height(Length::Fixed(180.0))).padding(6),
            focused,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
            text("Demo / Non-operational data").size(11),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(380.0));

        let map_column = column![text("Map").size(26), map]
            .spacing(10)
            .padding(16)
            .width(Length::Fill);

        let layout = row![console_column, map_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn review_panel<'a>(detection: Option<&DetectionView>, note: &str) -> Column<'a, Message> {
    let Some(detection) = detection.filter(|d| d.state == DetectionState::Unconfirmed) else {
        return Column::new().push(text("No detection awaiting review").size(12));
    };
    let id = detection.id.clone();
    column![
        text("Possible wildfire (AI-suggested)").size(18),
        text(format!(
            "{} | {}% confidence | {:.5}, {:.5}",
            detection.id,
            detection.confidence_pct,
            detection.location.lat,
            detection.location.lng
        ))
        .size(12),
        text_input("Operator note", note)
            .on_input(Message::NoteChanged)
            .padding(6),
        row![
            button("Confirm wildfire")
                .on_press(Message::Confirm(id.clone()))
                .padding(8),
            button("Reject").on_press(Message::Reject(id)).padding(8),
        ]
        .spacing(10),
    ]
    .spacing(6)
}

fn incident_list<'a>(snapshot: &ConsoleSnapshot) -> Column<'a, Message> {
    if snapshot.incidents.is_empty() {
        return Column::new().push(text("No incidents yet").size(12));
    }
    snapshot
        .incidents
        .iter()
        .fold(Column::new().spacing(4), |col, incident| {
            let marker = if snapshot.focused.as_deref() == Some(incident.id.as_str()) {
                "> "
            } else {
                ""
            };
            col.push(
                button(text(format!(
                    "{}{} | {} | {}",
                    marker,
                    incident.id,
                    incident.status_label,
                    impact_summary(incident)
                ))
                .size(12))
                .on_press(Message::Focus(incident.id.clone()))
                .padding(4),
            )
        })
}

fn focused_panel<'a>(snapshot: &ConsoleSnapshot) -> Column<'a, Message> {
    let Some(incident) = snapshot.focused_incident() else {
        return Column::new();
    };
    let status_buttons = LifecycleStatus::ALL.iter().fold(
        Column::new().spacing(4),
        |col, status| {
            let selectable = (incident.status != *status)
                .then(|| Message::SetStatus(incident.id.clone(), *status));
            col.push(button(text(status.label()).size(12)).on_press_maybe(selectable))
        },
    );
    let notes = incident
        .impact
        .as_ref()
        .map(|impact| impact.notes.clone())
        .unwrap_or_default();

    column![
        text(format!("Focused: {}", incident.id)).size(16),
        text(impact_summary(incident)).size(12),
        text(notes).size(12),
        text(format!("Note: {}", incident.operator_note)).size(12),
        status_buttons,
        button("Export JSON")
            .on_press_maybe(
                snapshot
                    .export_enabled
                    .then(|| Message::Export(incident.id.clone()))
            )
            .padding(8),
    ]
    .spacing(6)
}

fn impact_summary(incident: &IncidentView) -> String {
    match &incident.impact {
        Some(impact) => format!(
            "{} risk, r={} m, {}",
            impact.tier,
            impact.radius_m,
            impact.area_display()
        ),
        None => "no impact assessment".into(),
    }
}

fn post(events: Vec<ConsoleEvent>) -> Task<Message> {
    Task::perform(post_events(events), Message::EventsPosted)
}

async fn fetch_payload() -> Result<VisualizationPayload, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/snapshot"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<VisualizationPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_events(events: Vec<ConsoleEvent>) -> Result<(), String> {
    let client = reqwest::Client::new();
    for event in events {
        let response = client
            .post(format!("{BRIDGE_URL}/event"))
            .json(&event)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "".into());
            return Err(format!("{}: {}", status, text));
        }
    }
    Ok(())
}

async fn export_incident(incident_id: String) -> Result<String, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/export/{incident_id}"))
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let body = response.text().await.map_err(|e| e.to_string())?;
    if !status.is_success() {
        return Err(format!("{}: {}", status, body));
    }
    let document: serde_json::Value = serde_json::from_str(&body).map_err(|e| e.to_string())?;
    let pretty = serde_json::to_string_pretty(&document).map_err(|e| e.to_string())?;
    let path = format!("incident-{incident_id}.json");
    std::fs::write(&path, pretty).map_err(|e| e.to_string())?;
    Ok(path)
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VisualizationPayload {
    #[serde(default)]
    snapshot: ConsoleSnapshot,
    #[serde(default)]
    layers: MapLayers,
    #[serde(default)]
    status: String,
}

/// Lat/lng window shown on the map canvas (equirectangular).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    bounds: GeoBounds,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            bounds: GeoBounds::from_corners(LatLng::new(37.80, 23.40), LatLng::new(38.40, 24.20)),
        }
    }
}

impl Viewport {
    fn to_point(&self, location: LatLng, size: Size) -> Point {
        let b = self.bounds;
        let x = (location.lng - b.west) / b.lng_span() * f64::from(size.width);
        let y = (b.north - location.lat) / b.lat_span() * f64::from(size.height);
        Point::new(x as f32, y as f32)
    }

    fn to_lat_lng(&self, point: Point, size: Size) -> LatLng {
        let b = self.bounds;
        let lng = b.west + f64::from(point.x) / f64::from(size.width.max(1.0)) * b.lng_span();
        let lat = b.north - f64::from(point.y) / f64::from(size.height.max(1.0)) * b.lat_span();
        LatLng::new(lat, lng)
    }

    /// Horizontal pixel length of `metres` at the given latitude.
    fn metres_to_pixels(&self, metres: f64, lat: f64, size: Size) -> f32 {
        let metres_per_degree_lng = METRES_PER_DEGREE * lat.to_radians().cos();
        let degrees = metres / metres_per_degree_lng.max(1.0);
        (degrees / self.bounds.lng_span() * f64::from(size.width)) as f32
    }
}

#[derive(Debug, Default)]
struct DragState {
    start: Option<Point>,
    current: Option<Point>,
}

struct MapView {
    viewport: Viewport,
    layers: MapLayers,
    focused_marker: Option<MarkerId>,
}

fn marker_color(style: MarkerStyle) -> Color {
    match style {
        MarkerStyle::Unconfirmed => Color::from_rgb(0.98, 0.80, 0.20),
        MarkerStyle::AwaitingResponse => Color::from_rgb(0.95, 0.30, 0.15),
        MarkerStyle::ResponseDispatched => Color::from_rgb(0.95, 0.55, 0.20),
        MarkerStyle::Resolved => Color::from_rgb(0.35, 0.75, 0.40),
    }
}

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Low => Color::from_rgba(0.95, 0.80, 0.25, 0.25),
        RiskTier::Medium => Color::from_rgba(0.95, 0.55, 0.20, 0.30),
        RiskTier::High => Color::from_rgba(0.90, 0.20, 0.15, 0.35),
    }
}

impl canvas::Program<Message> for MapView {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                state.start = Some(position);
                state.current = Some(position);
                Some(canvas::Action::request_redraw().and_capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                state.start?;
                state.current = cursor.position_in(bounds).or(state.current);
                Some(canvas::Action::request_redraw())
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let start = state.start.take()?;
                let end = cursor
                    .position_in(bounds)
                    .or(state.current.take())
                    .unwrap_or(start);
                state.current = None;
                let size = bounds.size();
                Some(
                    canvas::Action::publish(Message::AreaDrawn(
                        self.viewport.to_lat_lng(start, size),
                        self.viewport.to_lat_lng(end, size),
                    ))
                    .and_capture(),
                )
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = bounds.size();
        let mut frame = Frame::new(renderer, size);
        frame.fill_rectangle(Point::ORIGIN, size, Color::from_rgb(0.06, 0.09, 0.07));

        let grid = Path::new(|builder| {
            for step in 1..8 {
                let x = size.width * step as f32 / 8.0;
                let y = size.height * step as f32 / 8.0;
                builder.move_to(Point::new(x, 0.0));
                builder.line_to(Point::new(x, size.height));
                builder.move_to(Point::new(0.0, y));
                builder.line_to(Point::new(size.width, y));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_color(Color::from_rgb(0.16, 0.20, 0.18))
                .with_width(1.0),
        );

        for circle in &self.layers.circles {
            let center = self.viewport.to_point(circle.center, size);
            let radius =
                self.viewport
                    .metres_to_pixels(f64::from(circle.radius_m), circle.center.lat, size);
            let path = Path::circle(center, radius.max(2.0));
            frame.fill(&path, tier_color(circle.tier));
        }

        if let Some(selection) = self.layers.selection {
            let top_left = self
                .viewport
                .to_point(LatLng::new(selection.north, selection.west), size);
            let bottom_right = self
                .viewport
                .to_point(LatLng::new(selection.south, selection.east), size);
            let rect = Path::rectangle(
                top_left,
                Size::new(bottom_right.x - top_left.x, bottom_right.y - top_left.y),
            );
            frame.stroke(
                &rect,
                Stroke::default()
                    .with_color(Color::from_rgb(0.25, 0.65, 0.95))
                    .with_width(2.0),
            );
        }

        if let (Some(start), Some(current)) = (state.start, state.current) {
            let top_left = Point::new(start.x.min(current.x), start.y.min(current.y));
            let rect = Path::rectangle(
                top_left,
                Size::new((start.x - current.x).abs(), (start.y - current.y).abs()),
            );
            frame.stroke(
                &rect,
                Stroke::default()
                    .with_color(Color::from_rgb(0.6, 0.8, 1.0))
                    .with_width(1.0),
            );
        }

        for marker in &self.layers.markers {
            let center = self.viewport.to_point(marker.location, size);
            if self.focused_marker == Some(marker.id) {
                let ring = Path::circle(center, 11.0);
                frame.stroke(
                    &ring,
                    Stroke::default()
                        .with_color(Color::WHITE)
                        .with_width(2.0),
                );
            }
            let dot = Path::circle(center, 7.0);
            frame.fill(&dot, marker_color(marker.style));
        }

        vec![frame.into_geometry()]
    }
}
