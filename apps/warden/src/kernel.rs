// [apps/warden/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: WARDEN SOVEREIGN KERNEL (V4.3 - ROLE BOUND)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: LIGADURA DE ROL, REGISTRO DE TAREAS Y APAGADO LIMPIO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ROLE BINDING: Cada proceso se liga en el arranque a un único rol;
 *    sólo los roles de drenaje adquieren el enlace al archivo duradero.
 * 2. EXPLICIT REGISTRATION: Las tareas programadas se registran contra
 *    el planificador en la ignición; no hay acoplamiento diferido.
 * 3. CLEAN RELEASE: Los enlaces a ambos almacenes se liberan en todos
 *    los caminos de salida al soltar el kernel.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::ValueEnum;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument};

use sentinel_domain_attestation::{AttestationVerifier, SafetyNetSettings};
use sentinel_infra_archive::{ArchiveClient, ExposurePayloadRepository, OperationalInfoRepository};
use sentinel_infra_coordination::broker::BrokerKeys;
use sentinel_infra_coordination::queues::QueueKeys;
use sentinel_infra_coordination::{
    CoordinationStore, IngestionQueues, QuotaLedger, RedisCoordinationClient, TaskBroker,
    UsedSaltRegistry,
};
use sentinel_infra_devicecheck::AppleDeviceCheckClient;
use sentinel_shared_config::SentinelConfig;

use crate::tasks::authorize_analytics_token::SleepWindow;
use crate::tasks::{
    delete_old_data, store_exposure_payloads, store_operational_info, AttestationTask,
    AuthorizationProtocol,
};

/// Espera máxima de un pop del broker antes de re-evaluar el apagado.
const BROKER_POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Rol operativo al que se liga el proceso en el arranque.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WardenRole {
    /// Consume trabajos del protocolo DeviceCheck (sin archivo).
    AuthorizationIos,
    /// Consume trabajos de verificación SafetyNet (sin archivo).
    AuthorizationAndroid,
    /// Drena exposure payloads y ejecuta el barrido de retención.
    Scheduled,
    /// Drena operational info hacia el archivo duradero.
    OperationalInfo,
}

pub struct WardenKernel;

impl WardenKernel {
    /**
     * Liga el proceso a su rol y bloquea hasta la señal de apagado.
     */
    #[instrument(skip(config))]
    pub async fn ignite_and_run(role: WardenRole, config: SentinelConfig) -> anyhow::Result<()> {
        info!("🛰️ [WARDEN]: Ignition sequence starting for role {:?}.", role);

        let coordination_store: Arc<dyn CoordinationStore> =
            Arc::new(RedisCoordinationClient::connect(&config.analytics_redis_url).await?);
        let config = Arc::new(config);

        match role {
            WardenRole::AuthorizationIos => {
                run_ios_authorization_consumer(config, coordination_store).await
            }
            WardenRole::AuthorizationAndroid => {
                run_android_verification_consumer(config, coordination_store).await
            }
            WardenRole::Scheduled => run_scheduled_drainers(config, coordination_store).await,
            WardenRole::OperationalInfo => {
                run_operational_info_drainer(config, coordination_store).await
            }
        }
    }
}

fn build_ingestion_queues(
    config: &SentinelConfig,
    coordination_store: Arc<dyn CoordinationStore>,
) -> IngestionQueues {
    IngestionQueues::new(
        coordination_store,
        QueueKeys {
            operational_info: config.operational_info_queue_key.clone(),
            exposure_payload: config.exposure_payload_queue_key.clone(),
            exposure_payload_errors: config.exposure_payload_errors_queue_key.clone(),
        },
    )
}

fn build_task_broker(
    config: &SentinelConfig,
    coordination_store: Arc<dyn CoordinationStore>,
) -> TaskBroker {
    TaskBroker::new(
        coordination_store,
        BrokerKeys {
            authorization_ios: config.authorization_ios_queue_key.clone(),
            authorization_android: config.authorization_android_queue_key.clone(),
        },
    )
}

/// Crontab de cinco campos del entorno -> dialecto con segundos del
/// planificador.
fn cron_with_seconds(five_field_expression: &str) -> String {
    format!("0 {five_field_expression}")
}

async fn run_ios_authorization_consumer(
    config: Arc<SentinelConfig>,
    coordination_store: Arc<dyn CoordinationStore>,
) -> anyhow::Result<()> {
    let device_check_client = AppleDeviceCheckClient::new(
        config.apple_device_check_url.clone(),
        config.apple_team_id.clone(),
        config.apple_key_id.clone(),
        &config.apple_certificate_key,
        config.requests_timeout_seconds,
    )?;

    let authorization_protocol = AuthorizationProtocol::new(
        Arc::new(device_check_client),
        QuotaLedger::new(
            coordination_store.clone(),
            config.analytics_token_expiration_days,
        ),
        config.environment,
        SleepWindow {
            min_seconds: config.check_time_seconds_min,
            max_seconds: config.check_time_seconds_max,
        },
        SleepWindow {
            min_seconds: config.read_time_seconds_min,
            max_seconds: config.read_time_seconds_max,
        },
    );

    let task_broker = build_task_broker(&config, coordination_store);
    info!("🧑‍⚖️ [WARDEN]: iOS authorization consumer operational.");

    let shutdown_signal = tokio::signal::ctrl_c();
    tokio::pin!(shutdown_signal);

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("📴 [WARDEN]: Shutdown signal received; releasing store handles.");
                return Ok(());
            }
            next_job = task_broker.next_ios_authorization(BROKER_POLL_TIMEOUT) => {
                match next_job {
                    Ok(Some(job)) => authorization_protocol.authorize_analytics_token(&job).await,
                    Ok(None) => {}
                    Err(broker_fault) => {
                        error!(error = %broker_fault, "💥 [WARDEN]: Broker pop failed; backing off.");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }
}

async fn run_android_verification_consumer(
    config: Arc<SentinelConfig>,
    coordination_store: Arc<dyn CoordinationStore>,
) -> anyhow::Result<()> {
    let attestation_task = AttestationTask::new(
        AttestationVerifier::new(SafetyNetSettings {
            apk_digest: config.safety_net_apk_digest.clone(),
            package_name: config.safety_net_package_name.clone(),
            issuer_hostname: config.safety_net_issuer_hostname.clone(),
            max_skew_minutes: config.safety_net_max_skew_minutes,
        }),
        UsedSaltRegistry::new(
            coordination_store.clone(),
            config.safety_net_max_skew_minutes as u64,
        ),
        build_ingestion_queues(&config, coordination_store.clone()),
    );

    let task_broker = build_task_broker(&config, coordination_store);
    info!("🧑‍⚖️ [WARDEN]: Android verification consumer operational.");

    let shutdown_signal = tokio::signal::ctrl_c();
    tokio::pin!(shutdown_signal);

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("📴 [WARDEN]: Shutdown signal received; releasing store handles.");
                return Ok(());
            }
            next_job = task_broker.next_android_verification(BROKER_POLL_TIMEOUT) => {
                match next_job {
                    Ok(Some(job)) => attestation_task.verify_and_record(&job).await,
                    Ok(None) => {}
                    Err(broker_fault) => {
                        error!(error = %broker_fault, "💥 [WARDEN]: Broker pop failed; backing off.");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }
}

async fn run_scheduled_drainers(
    config: Arc<SentinelConfig>,
    coordination_store: Arc<dyn CoordinationStore>,
) -> anyhow::Result<()> {
    let archive_client = ArchiveClient::connect(
        &config.archive_database_url,
        config.archive_auth_token.clone(),
    )
    .await?;

    let ingestion_queues = Arc::new(build_ingestion_queues(&config, coordination_store));
    let exposure_repository = Arc::new(ExposurePayloadRepository::new(archive_client.clone()));
    let operational_repository = Arc::new(OperationalInfoRepository::new(archive_client));

    let mut job_scheduler = JobScheduler::new()
        .await
        .map_err(|fault| anyhow!("SCHEDULER_IGNITION_FAULT: {fault}"))?;

    // --- REGISTRO EXPLÍCITO: DRENAJE DE EXPOSURE PAYLOADS ---
    {
        let ingestion_queues = ingestion_queues.clone();
        let exposure_repository = exposure_repository.clone();
        let max_elements = config.exposure_payload_max_ingested_elements;
        let cron_expression = cron_with_seconds(&config.store_ingested_data_periodicity);

        job_scheduler
            .add(
                Job::new_async(cron_expression.as_str(), move |_job_id, _scheduler| {
                    let ingestion_queues = ingestion_queues.clone();
                    let exposure_repository = exposure_repository.clone();
                    Box::pin(async move {
                        if let Err(task_fault) = store_exposure_payloads::run(
                            &ingestion_queues,
                            &exposure_repository,
                            max_elements,
                        )
                        .await
                        {
                            error!(error = %task_fault, "💥 [SCHEDULER]: store_exposure_payloads collapsed.");
                        }
                    })
                })
                .map_err(|fault| anyhow!("JOB_REGISTRATION_FAULT: {fault}"))?,
            )
            .await
            .map_err(|fault| anyhow!("JOB_REGISTRATION_FAULT: {fault}"))?;
    }

    // --- REGISTRO EXPLÍCITO: BARRIDO DE RETENCIÓN ---
    {
        let exposure_repository = exposure_repository.clone();
        let operational_repository = operational_repository.clone();
        let data_retention_days = config.data_retention_days;
        let cron_expression = cron_with_seconds(&config.delete_old_data_periodicity);

        job_scheduler
            .add(
                Job::new_async(cron_expression.as_str(), move |_job_id, _scheduler| {
                    let exposure_repository = exposure_repository.clone();
                    let operational_repository = operational_repository.clone();
                    Box::pin(async move {
                        if let Err(task_fault) = delete_old_data::run(
                            &exposure_repository,
                            &operational_repository,
                            data_retention_days,
                        )
                        .await
                        {
                            error!(error = %task_fault, "💥 [SCHEDULER]: delete_old_data collapsed.");
                        }
                    })
                })
                .map_err(|fault| anyhow!("JOB_REGISTRATION_FAULT: {fault}"))?,
            )
            .await
            .map_err(|fault| anyhow!("JOB_REGISTRATION_FAULT: {fault}"))?;
    }

    job_scheduler
        .start()
        .await
        .map_err(|fault| anyhow!("SCHEDULER_START_FAULT: {fault}"))?;
    info!("⏰ [WARDEN]: Scheduled drainers operational.");

    tokio::signal::ctrl_c().await?;
    info!("📴 [WARDEN]: Shutdown signal received; stopping scheduler.");
    job_scheduler
        .shutdown()
        .await
        .map_err(|fault| anyhow!("SCHEDULER_SHUTDOWN_FAULT: {fault}"))?;

    Ok(())
}

async fn run_operational_info_drainer(
    config: Arc<SentinelConfig>,
    coordination_store: Arc<dyn CoordinationStore>,
) -> anyhow::Result<()> {
    let archive_client = ArchiveClient::connect(
        &config.archive_database_url,
        config.archive_auth_token.clone(),
    )
    .await?;

    let ingestion_queues = Arc::new(build_ingestion_queues(&config, coordination_store));
    let operational_repository = Arc::new(OperationalInfoRepository::new(archive_client));

    let mut job_scheduler = JobScheduler::new()
        .await
        .map_err(|fault| anyhow!("SCHEDULER_IGNITION_FAULT: {fault}"))?;

    let max_elements = config.operational_info_max_ingested_elements;
    let cron_expression = cron_with_seconds(&config.store_operational_info_periodicity);

    job_scheduler
        .add(
            Job::new_async(cron_expression.as_str(), move |_job_id, _scheduler| {
                let ingestion_queues = ingestion_queues.clone();
                let operational_repository = operational_repository.clone();
                Box::pin(async move {
                    if let Err(task_fault) = store_operational_info::run(
                        &ingestion_queues,
                        &operational_repository,
                        max_elements,
                    )
                    .await
                    {
                        error!(error = %task_fault, "💥 [SCHEDULER]: store_operational_info collapsed.");
                    }
                })
            })
            .map_err(|fault| anyhow!("JOB_REGISTRATION_FAULT: {fault}"))?,
        )
        .await
        .map_err(|fault| anyhow!("JOB_REGISTRATION_FAULT: {fault}"))?;

    job_scheduler
        .start()
        .await
        .map_err(|fault| anyhow!("SCHEDULER_START_FAULT: {fault}"))?;
    info!("⏰ [WARDEN]: Operational info drainer operational.");

    tokio::signal::ctrl_c().await?;
    info!("📴 [WARDEN]: Shutdown signal received; stopping scheduler.");
    job_scheduler
        .shutdown()
        .await
        .map_err(|fault| anyhow!("SCHEDULER_SHUTDOWN_FAULT: {fault}"))?;

    Ok(())
}
// FIN DEL ARCHIVO [apps/warden/src/kernel.rs]
