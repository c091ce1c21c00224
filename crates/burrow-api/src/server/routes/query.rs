#[derive(Debug, Serialize)]
struct QueryResponse {
    schema_version: String,
    query_type: String,
    run_id: String,
    generated_at_tick: u64,
    data: serde_json::Value,
}

async fn get_status(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RunControlResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let status = require_run(&inner, &run_id)?.status().clone();
    Ok(Json(RunControlResponse::new(status, None)))
}

#[derive(Debug, Deserialize, Default)]
struct TimelineQuery {
    from_tick: Option<u64>,
    to_tick: Option<u64>,
    scope: Option<String>,
    #[serde(default)]
    kinds: Vec<String>,
    #[serde(rename = "kinds[]", default)]
    kinds_bracket: Vec<String>,
    animal_id: Option<String>,
    cursor: Option<usize>,
    page_size: Option<usize>,
}

async fn get_timeline(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let response = {
        let inner = state.inner.lock().await;
        let engine = require_run(&inner, &run_id)?;

        let current_tick = engine.status().current_tick;
        let from_tick = query.from_tick.unwrap_or(0);
        let to_tick = query.to_tick.unwrap_or(current_tick);

        if to_tick < from_tick {
            return Err(HttpApiError::invalid_query(
                "to_tick must be >= from_tick",
                Some(format!("from_tick={from_tick} to_tick={to_tick}")),
            ));
        }

        let scope_filter = parse_scope_filter(query.scope.as_deref())?;
        let mut requested_kinds = query.kinds;
        requested_kinds.extend(query.kinds_bracket);
        let kind_filter = parse_event_kind_filter(&requested_kinds)?;

        let mut filtered = Vec::new();
        for event in engine.events() {
            if event.tick < from_tick || event.tick > to_tick {
                continue;
            }
            if let Some(scope) = scope_filter {
                if event.scope != scope {
                    continue;
                }
            }
            if let Some(filter) = &kind_filter {
                if !filter.contains(&event.kind) {
                    continue;
                }
            }
            if let Some(animal_id) = &query.animal_id {
                if event.animal_id.as_deref() != Some(animal_id.as_str()) {
                    continue;
                }
            }
            filtered.push(event.clone());
        }

        let (start, end, next_cursor) = paginate(filtered.len(), query.cursor, query.page_size)?;

        QueryResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            query_type: "timeline.window".to_string(),
            run_id: run_id.clone(),
            generated_at_tick: current_tick,
            data: json!({
                "cursor": start,
                "next_cursor": next_cursor,
                "from_tick": from_tick,
                "to_tick": to_tick,
                "total": filtered.len(),
                "events": filtered[start..end].to_vec(),
            }),
        }
    };

    Ok(Json(response))
}

async fn get_creatures(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    let creatures = engine.creature_snapshots();

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "creatures.list".to_string(),
        run_id: run_id.clone(),
        generated_at_tick: engine.status().current_tick,
        data: json!({
            "count": creatures.len(),
            "creatures": creatures,
        }),
    }))
}

async fn get_creature(
    Path((run_id, animal_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let Some(snapshot) = engine.inspect_creature(&animal_id) else {
        return Err(HttpApiError::invalid_query(
            "animal_id not found in run",
            Some(format!("animal_id={animal_id}")),
        ));
    };

    // Most recent events carry the short-term story of this creature.
    let recent_events = engine
        .events()
        .iter()
        .rev()
        .filter(|event| event.animal_id.as_deref() == Some(animal_id.as_str()))
        .take(16)
        .cloned()
        .collect::<Vec<_>>();

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "creature.inspect".to_string(),
        run_id: run_id.clone(),
        generated_at_tick: engine.status().current_tick,
        data: json!({
            "creature": snapshot,
            "recent_events": recent_events,
        }),
    }))
}

async fn get_territory(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    let hexes = engine.territory_view();

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "territory.view".to_string(),
        run_id: run_id.clone(),
        generated_at_tick: engine.status().current_tick,
        data: json!({
            "count": hexes.len(),
            "hexes": hexes,
        }),
    }))
}

async fn get_combat_reports(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    let reports = engine.combat_reports();

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "combat.reports".to_string(),
        run_id: run_id.clone(),
        generated_at_tick: engine.status().current_tick,
        data: json!({
            "combat_active": engine.is_combat_active(),
            "count": reports.len(),
            "reports": reports,
        }),
    }))
}

#[derive(Debug, Deserialize, Default)]
struct PaginationQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct CommandAuditPage {
    schema_version: String,
    run_id: String,
    cursor: usize,
    next_cursor: Option<usize>,
    entries: Vec<CommandRecord>,
}

async fn get_commands(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CommandAuditPage>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;
    let entries = engine.command_audit();
    let (start, end, next_cursor) = paginate(entries.len(), query.cursor, query.page_size)?;

    Ok(Json(CommandAuditPage {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        run_id: run_id.clone(),
        cursor: start,
        next_cursor,
        entries: entries[start..end].to_vec(),
    }))
}

fn paginate(
    total: usize,
    cursor: Option<usize>,
    page_size: Option<usize>,
) -> Result<(usize, usize, Option<usize>), HttpApiError> {
    let start = cursor.unwrap_or(0);
    if start > total {
        return Err(HttpApiError::invalid_query(
            "cursor is out of bounds",
            Some(format!("cursor={start} total={total}")),
        ));
    }

    let size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1)
        .min(MAX_PAGE_SIZE);
    let end = start.saturating_add(size).min(total);
    let next_cursor = if end < total { Some(end) } else { None };

    Ok((start, end, next_cursor))
}

fn parse_scope_filter(scope: Option<&str>) -> Result<Option<EventScope>, HttpApiError> {
    let Some(scope) = scope else {
        return Ok(None);
    };
    match scope.trim().to_lowercase().as_str() {
        "local" => Ok(Some(EventScope::Local)),
        "global" => Ok(Some(EventScope::Global)),
        other => Err(HttpApiError::invalid_query(
            "invalid scope filter",
            Some(format!("scope={other}")),
        )),
    }
}

fn parse_event_kind_filter(
    requested_kinds: &[String],
) -> Result<Option<HashSet<EventKind>>, HttpApiError> {
    if requested_kinds.is_empty() {
        return Ok(None);
    }

    let mut filter = HashSet::new();

    for value in requested_kinds {
        let normalized = value.trim().to_lowercase();
        let kind = match normalized.as_str() {
            "energy_changed" | "energychanged" => EventKind::EnergyChanged,
            "energy_low" | "energylow" => EventKind::EnergyLow,
            "energy_depleted" | "energydepleted" => EventKind::EnergyDepleted,
            "mood_changed" | "moodchanged" => EventKind::MoodChanged,
            "state_changed" | "statechanged" => EventKind::StateChanged,
            "resting" => EventKind::Resting,
            "recovered" => EventKind::Recovered,
            "hex_claimed" | "hexclaimed" => EventKind::HexClaimed,
            "hex_scouted" | "hexscouted" => EventKind::HexScouted,
            "combat_started" | "combatstarted" => EventKind::CombatStarted,
            "combat_turn_resolved" | "combatturnresolved" => EventKind::CombatTurnResolved,
            "combat_retreat_started" | "combatretreatstarted" => EventKind::CombatRetreatStarted,
            "animal_tired" | "animaltired" => EventKind::AnimalTired,
            "combat_ended" | "combatended" => EventKind::CombatEnded,
            _ => {
                return Err(HttpApiError::invalid_query(
                    "invalid event kind filter",
                    Some(format!("kind={value}")),
                ))
            }
        };

        filter.insert(kind);
    }

    Ok(Some(filter))
}
