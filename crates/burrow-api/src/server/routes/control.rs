#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateRunRequest {
    Config(SimConfig),
    WithOptions(CreateRunOptions),
}

#[derive(Debug, Deserialize)]
struct CreateRunOptions {
    config: SimConfig,
    auto_start: Option<bool>,
}

#[derive(Debug, Serialize)]
struct CreateRunResponse {
    schema_version: String,
    run_id: String,
    status: RunStatus,
    replaced_existing_run: bool,
    started: bool,
}

async fn create_run(
    State(state): State<AppState>,
    Json(request): Json<CreateRunRequest>,
) -> Result<Json<CreateRunResponse>, HttpApiError> {
    let (config, auto_start) = match request {
        CreateRunRequest::Config(config) => (config, false),
        CreateRunRequest::WithOptions(options) => {
            (options.config, options.auto_start.unwrap_or(false))
        }
    };

    let response = {
        let mut inner = state.inner.lock().await;
        let replaced_existing_run = inner.engine.is_some();
        if replaced_existing_run {
            warn!(run_id = %config.run_id, "existing run state replaced by POST /runs");
        }

        let mut engine = EngineApi::from_config(config);
        if auto_start {
            engine.start();
        }

        let status = engine.status().clone();
        info!(run_id = %status.run_id, started = auto_start, "run created");
        inner.engine = Some(engine);

        CreateRunResponse {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: status.run_id.clone(),
            status,
            replaced_existing_run,
            started: auto_start,
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct RunControlResponse {
    schema_version: String,
    run_id: String,
    status: RunStatus,
    committed: Option<u64>,
}

impl RunControlResponse {
    fn new(status: RunStatus, committed: Option<u64>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: status.run_id.clone(),
            status,
            committed,
        }
    }
}

async fn start_run(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RunControlResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let status = require_run_mut(&mut inner, &run_id)?.start().clone();
    Ok(Json(RunControlResponse::new(status, None)))
}

async fn pause_run(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RunControlResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let status = require_run_mut(&mut inner, &run_id)?.pause().clone();
    Ok(Json(RunControlResponse::new(status, None)))
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    steps: Option<u64>,
}

async fn step_run(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> Result<Json<RunControlResponse>, HttpApiError> {
    let steps = request.steps.unwrap_or(1);
    if steps == 0 {
        return Err(HttpApiError::invalid_query(
            "steps must be >= 1",
            Some("steps=0".to_string()),
        ));
    }

    let mut inner = state.inner.lock().await;
    let engine = require_run_mut(&mut inner, &run_id)?;
    let (status, committed) = engine.step(steps);
    let status = status.clone();
    info!(run_id = %run_id, committed, tick = status.current_tick, "step");
    Ok(Json(RunControlResponse::new(status, Some(committed))))
}

#[derive(Debug, Deserialize)]
struct RunToTickRequest {
    target_tick: u64,
}

async fn run_to_tick(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<RunToTickRequest>,
) -> Result<Json<RunControlResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_run_mut(&mut inner, &run_id)?;
    let (status, committed) = engine.run_to_tick(request.target_tick);
    let status = status.clone();
    Ok(Json(RunControlResponse::new(status, Some(committed))))
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    state: BehaviorState,
}

#[derive(Debug, Serialize)]
struct CommandResponse {
    schema_version: String,
    run_id: String,
    record: CommandRecord,
    status: RunStatus,
}

async fn post_transition(
    Path((run_id, animal_id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<CommandResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_run_mut(&mut inner, &run_id)?;
    if engine.inspect_creature(&animal_id).is_none() {
        return Err(HttpApiError::invalid_command(
            "animal_id not found in run",
            Some(format!("animal_id={animal_id}")),
        ));
    }

    let record = engine.request_transition(&animal_id, request.state);
    if !record.accepted {
        warn!(run_id = %run_id, animal_id = %animal_id, "transition rejected");
    }
    Ok(Json(CommandResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        run_id,
        record,
        status: engine.status().clone(),
    }))
}

#[derive(Debug, Deserialize)]
struct CombatRequest {
    roster: Vec<String>,
    hex: HexCoord,
    wild_group_id: String,
}

async fn post_combat(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<CombatRequest>,
) -> Result<Json<CommandResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let engine = require_run_mut(&mut inner, &run_id)?;
    if engine.is_combat_active() {
        return Err(HttpApiError::run_state_conflict(
            "a combat session is already active",
            None,
        ));
    }

    let record = engine.start_combat(&request.roster, request.hex, &request.wild_group_id);
    if !record.accepted {
        warn!(
            run_id = %run_id,
            wild_group_id = %request.wild_group_id,
            "combat request rejected"
        );
        return Err(HttpApiError::invalid_command(
            "combat request rejected",
            Some(format!("wild_group_id={}", request.wild_group_id)),
        ));
    }

    info!(run_id = %run_id, wild_group_id = %request.wild_group_id, "combat started");
    Ok(Json(CommandResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        run_id,
        record,
        status: engine.status().clone(),
    }))
}
