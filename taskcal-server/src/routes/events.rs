//! Reminder push channel (Server-Sent Events)

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use taskcal_core::reminder::REMINDER_EVENT;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(reminder_stream))
}

/// GET /events - Stream `task_reminder` events as they come due
async fn reminder_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Reminder subscriber connected");

    let stream = BroadcastStream::new(state.reminders.subscribe()).filter_map(|message| {
        match message {
            Ok(reminder) => Event::default()
                .event(REMINDER_EVENT)
                .json_data(&reminder)
                .ok()
                .map(Ok),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(missed, "Reminder subscriber lagged");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use chrono::{Duration, Local, Timelike};
    use taskcal_core::{Horizon, Recurrence, Reminder, Task, TaskTime};
    use tower::ServiceExt;

    use crate::db::TaskRepo;
    use crate::routes::app;
    use crate::state::AppState;

    #[tokio::test]
    async fn events_endpoint_is_an_event_stream() {
        let state = AppState::with_repo(TaskRepo::open_in_memory().unwrap(), Horizon::default());

        let response = app(state)
            .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn due_reminder_is_written_as_task_reminder_event() {
        let state = AppState::with_repo(TaskRepo::open_in_memory().unwrap(), Horizon::default());
        let response = app(state.clone())
            .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let due = Local::now().naive_local() + Duration::minutes(2);
        let task = Task {
            id: 1,
            title: "Stretch".into(),
            due_date: due.date(),
            time: TaskTime::new(due.hour(), due.minute()).unwrap(),
            recurrence: Recurrence::None,
            completed: false,
        };
        state.reminders.schedule(&task);

        // Keep-alive comments may arrive first while the clock advances.
        let mut body = response.into_body().into_data_stream();
        let text = loop {
            let chunk = tokio_stream::StreamExt::next(&mut body).await.unwrap().unwrap();
            let text = String::from_utf8(chunk.to_vec()).unwrap();
            if text.contains("event: task_reminder") {
                break text;
            }
        };

        let data = text
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap();
        let reminder = Reminder::from_json(data).unwrap();
        assert_eq!(reminder.title, "Stretch");
        assert_eq!(reminder.due_at, task.start());
    }
}
