//! Calendar handlers -- event creation and today's availabilities.
//!
//! Both handlers generate Calendar.app instruction blocks against the
//! configured calendar.  Parsing of the event description itself lives in
//! [`crate::event`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tracing::debug;

use herald_kernel::text;
use herald_kernel::{FieldMap, Handler, Invocation, KernelError, Outcome};

use crate::backend::{self, ScriptBackend};
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::event;

/// Surface prefix of the add-event intent.
const ADD_EVENT_PREFIX: &str = "add event ";

/// Surface word of the availabilities intent; the whole (trimmed) command.
const AVAILABILITIES_WORD: &str = "availabilities";

// ---------------------------------------------------------------------------
// Invocations
// ---------------------------------------------------------------------------

/// `add event <description>` -- delegates extraction to the tokenizer.
struct AddEventInvocation;

#[async_trait]
impl Invocation for AddEventInvocation {
    fn recognize(&self, command: &str) -> bool {
        text::strip_prefix_ignore_case(command, ADD_EVENT_PREFIX).is_some()
    }

    async fn parse(&self, command: &str) -> herald_kernel::Result<FieldMap> {
        let rest = text::strip_prefix_ignore_case(command, ADD_EVENT_PREFIX).ok_or_else(|| {
            KernelError::MalformedInput {
                reason: format!("command does not start with `{ADD_EVENT_PREFIX}`"),
            }
        })?;

        let details = event::parse_event(rest, Local::now().date_naive())?;

        let mut fields = FieldMap::new();
        fields.set("eventName", details.event_name);
        fields.set("startDate", details.start_date);
        fields.set("location", details.location);
        fields.set("durationHours", details.duration_hours.to_string());
        Ok(fields)
    }
}

/// The bare word `availabilities`, nothing else.
struct AvailabilitiesInvocation;

#[async_trait]
impl Invocation for AvailabilitiesInvocation {
    fn recognize(&self, command: &str) -> bool {
        command.trim().eq_ignore_ascii_case(AVAILABILITIES_WORD)
    }

    async fn parse(&self, _command: &str) -> herald_kernel::Result<FieldMap> {
        Ok(FieldMap::new())
    }
}

// ---------------------------------------------------------------------------
// AddEventHandler
// ---------------------------------------------------------------------------

/// Handler for the add-calendar-event intent.
pub struct AddEventHandler {
    invocations: Vec<Box<dyn Invocation>>,
    config: HandlerConfig,
    backend: Arc<dyn ScriptBackend>,
}

impl AddEventHandler {
    pub fn new(config: HandlerConfig, backend: Arc<dyn ScriptBackend>) -> Self {
        Self {
            invocations: vec![Box::new(AddEventInvocation)],
            config,
            backend,
        }
    }

    /// Remember the frontmost app, create the event, restore the app.
    fn creation_script(&self, fields: &FieldMap) -> Result<String, HandlerError> {
        let event_name = fields.require("eventName")?;
        let start_date = fields.require("startDate")?;
        let location = fields.require("location")?;
        let duration: f64 = fields
            .require("durationHours")?
            .parse()
            .map_err(|_| KernelError::MalformedInput {
                reason: "duration is not numeric".to_string(),
            })?;

        debug!(
            event = event_name,
            start = start_date,
            hours = duration,
            "creating calendar event"
        );

        Ok(format!(
            "set prevApp to path to frontmost application as text\n\
             \n\
             tell application \"Calendar\"\n\
             \ttell calendar \"{calendar}\"\n\
             \t\tset startDate to date \"{start}\"\n\
             \t\tset endDate to startDate + ({duration} * hours)\n\
             \t\tmake new event with properties {{summary:\"{summary}\", \
             start date:startDate, end date:endDate, location:\"{location}\"}}\n\
             \tend tell\n\
             end tell\n\
             \n\
             activate application prevApp",
            calendar = backend::escape(&self.config.calendar_name),
            start = backend::escape(start_date),
            summary = backend::escape(event_name),
            location = backend::escape(location),
        ))
    }
}

#[async_trait]
impl Handler for AddEventHandler {
    fn name(&self) -> &'static str {
        "add-event"
    }

    fn recognize(&self, command: &str) -> Option<usize> {
        self.invocations.iter().position(|inv| inv.recognize(command))
    }

    async fn handle(&self, command: &str, invocation: usize) -> Outcome {
        let Some(inv) = self.invocations.get(invocation) else {
            return Outcome::error(format!("add-event has no invocation {invocation}"));
        };

        let fields = match inv.parse(command).await {
            Ok(fields) => fields,
            Err(e) => return Outcome::error(e.to_string()),
        };
        let script = match self.creation_script(&fields) {
            Ok(script) => script,
            Err(e) => return e.into(),
        };
        self.backend.execute(&script).await
    }
}

// ---------------------------------------------------------------------------
// AvailabilitiesHandler
// ---------------------------------------------------------------------------

/// Handler for the today's-availabilities intent.
pub struct AvailabilitiesHandler {
    invocations: Vec<Box<dyn Invocation>>,
    config: HandlerConfig,
    backend: Arc<dyn ScriptBackend>,
}

impl AvailabilitiesHandler {
    pub fn new(config: HandlerConfig, backend: Arc<dyn ScriptBackend>) -> Self {
        Self {
            invocations: vec![Box::new(AvailabilitiesInvocation)],
            config,
            backend,
        }
    }

    /// Enumerate today's events, midnight to midnight, skipping instances
    /// excluded from their recurrence.  Times render as `HH:MM - HH:MM`
    /// with single-digit hours padded to keep columns aligned; all-day
    /// events render as `all day`.
    fn enumeration_script(&self) -> String {
        format!(
            "set dayStart to current date\n\
             set hours of dayStart to 0\n\
             set minutes of dayStart to 0\n\
             set seconds of dayStart to 0\n\
             set dayEnd to dayStart + (1 * days)\n\
             \n\
             set output to \"\"\n\
             tell application \"Calendar\"\n\
             \ttell calendar \"{calendar}\"\n\
             \t\tset todayEvents to every event whose start date is greater than or equal to \
             dayStart and start date is less than dayEnd\n\
             \t\trepeat with anEvent in todayEvents\n\
             \t\t\tif excluded dates of anEvent does not contain start date of anEvent then\n\
             \t\t\t\tif allday event of anEvent then\n\
             \t\t\t\t\tset output to output & \"all day\" & linefeed\n\
             \t\t\t\telse\n\
             \t\t\t\t\tset output to output & my clockText(start date of anEvent) & \" - \" & \
             my clockText(end date of anEvent) & linefeed\n\
             \t\t\t\tend if\n\
             \t\t\tend if\n\
             \t\tend repeat\n\
             \tend tell\n\
             end tell\n\
             return output\n\
             \n\
             on clockText(theDate)\n\
             \tset h to hours of theDate\n\
             \tset m to minutes of theDate\n\
             \tset hourText to h as text\n\
             \tif h < 10 then set hourText to \" \" & hourText\n\
             \tset minuteText to m as text\n\
             \tif m < 10 then set minuteText to \"0\" & minuteText\n\
             \treturn hourText & \":\" & minuteText\n\
             end clockText",
            calendar = backend::escape(&self.config.calendar_name),
        )
    }
}

#[async_trait]
impl Handler for AvailabilitiesHandler {
    fn name(&self) -> &'static str {
        "availabilities"
    }

    fn recognize(&self, command: &str) -> Option<usize> {
        self.invocations.iter().position(|inv| inv.recognize(command))
    }

    async fn handle(&self, command: &str, invocation: usize) -> Outcome {
        let Some(inv) = self.invocations.get(invocation) else {
            return Outcome::error(format!("availabilities has no invocation {invocation}"));
        };
        if let Err(e) = inv.parse(command).await {
            return Outcome::error(e.to_string());
        }
        self.backend.execute(&self.enumeration_script()).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
