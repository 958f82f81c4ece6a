//! Dev harness: runs the engine against the in-memory collaborators.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};

use magasin_core::{EquipmentId, TechnicianId};
use magasin_engine::{
    InMemoryEquipmentRepository, InMemoryNoteRepository, InMemoryOrderGateway,
    InMemoryTechnicianDirectory, Magasin, Scheduler, SchedulerConfig,
};
use magasin_stock::{Equipment, EquipmentDraft};
use magasin_workflow::Technician;

#[tokio::main]
async fn main() -> Result<()> {
    magasin_observability::init();

    let equipements = Arc::new(InMemoryEquipmentRepository::with_records(sample_catalog()));
    let notes = Arc::new(InMemoryNoteRepository::new());
    let techniciens = Arc::new(InMemoryTechnicianDirectory::with_roster(sample_roster()));
    let orders = Arc::new(InMemoryOrderGateway::new());

    let magasin = Arc::new(Magasin::new(equipements, notes, techniciens, orders));
    magasin.refresh_catalog(Utc::now()).await?;
    magasin.refresh_roster(Utc::now()).await?;

    let scheduler = Scheduler::start(magasin.clone(), SchedulerConfig::default());
    tracing::info!("magasin démarré, Ctrl-C pour arrêter");

    tokio::signal::ctrl_c().await?;
    scheduler.shutdown();
    scheduler.join().await;
    tracing::info!("magasin arrêté");
    Ok(())
}

fn sample_catalog() -> Vec<Equipment> {
    let now = Utc::now();
    let drafts = [
        ("IMO-1001", "Oscilloscope", "Oscilloscope 4 voies", "Mesure", 6, Some(400), Some(200)),
        ("IMO-1002", "Multimètre", "Multimètre de précision", "Mesure", 2, Some(90), Some(20)),
        ("IMO-1003", "Station de soudage", "Station à air chaud", "Outillage", 0, Some(1300), None),
        ("IMO-1004", "Caméra thermique", "Caméra d'inspection", "Inspection", 11, None, Some(500)),
    ];

    drafts
        .into_iter()
        .enumerate()
        .map(|(i, (code, nom, designation, categorie, nombre, age_days, warranty_days))| {
            EquipmentDraft {
                code_imo: code.to_string(),
                nom_testeur: "B. Haddad".to_string(),
                nom_equipement: nom.to_string(),
                designation: designation.to_string(),
                categorie: categorie.to_string(),
                date_mise_en_marche: age_days.map(|d| now - Duration::days(d)),
                date_garantie: warranty_days.map(|d| now + Duration::days(d)),
                nombre,
                ..EquipmentDraft::default()
            }
            .build(EquipmentId::new(i as i64 + 1))
            .expect("sample draft is valid")
        })
        .collect()
}

fn sample_roster() -> Vec<Technician> {
    vec![
        Technician {
            id: TechnicianId::new(1),
            prenom: "Selma".to_string(),
            nom: "Trabelsi".to_string(),
            email: "selma.trabelsi@example.com".to_string(),
            image: None,
        },
        Technician {
            id: TechnicianId::new(2),
            prenom: "Karim".to_string(),
            nom: "Mansour".to_string(),
            email: "karim.mansour@example.com".to_string(),
            image: None,
        },
    ]
}
