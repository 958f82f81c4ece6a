//! Integration tests for the full engine.
//!
//! Exercise: collaborator → facade → state, with virtual time driving the
//! deadline sweeps.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, SeedableRng};

use magasin_core::{DomainError, EquipmentId, TechnicianId};
use magasin_stock::{Equipment, EquipmentDraft};
use magasin_workflow::{RequestStatus, Technician};

use crate::in_memory::{
    InMemoryEquipmentRepository, InMemoryNoteRepository, InMemoryOrderGateway,
    InMemoryTechnicianDirectory,
};
use crate::service::Magasin;
use crate::state::MaintenanceKind;

struct Harness {
    magasin: Arc<Magasin>,
    equipements: Arc<InMemoryEquipmentRepository>,
    techniciens: Arc<InMemoryTechnicianDirectory>,
    orders: Arc<InMemoryOrderGateway>,
}

fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 4, 16, 0, 0).unwrap()
}

fn test_equipment(id: i64, nombre: u32) -> Equipment {
    EquipmentDraft {
        code_imo: format!("IMO-{id}"),
        nom_testeur: "B. Haddad".to_string(),
        nom_equipement: format!("Alimentation {id}"),
        designation: "Alimentation stabilisée".to_string(),
        categorie: "Mesure".to_string(),
        nombre,
        ..EquipmentDraft::default()
    }
    .build(EquipmentId::new(id))
    .unwrap()
}

fn test_technician(id: i64) -> Technician {
    Technician {
        id: TechnicianId::new(id),
        prenom: "Selma".to_string(),
        nom: "Trabelsi".to_string(),
        email: "selma.trabelsi@example.com".to_string(),
        image: None,
    }
}

async fn setup(catalog: Vec<Equipment>) -> Harness {
    let equipements = Arc::new(InMemoryEquipmentRepository::with_records(catalog));
    let notes = Arc::new(InMemoryNoteRepository::new());
    let techniciens = Arc::new(InMemoryTechnicianDirectory::with_roster(vec![
        test_technician(1),
    ]));
    let orders = Arc::new(InMemoryOrderGateway::new());

    let magasin = Arc::new(Magasin::with_rng(
        equipements.clone(),
        notes,
        techniciens.clone(),
        orders.clone(),
        StdRng::seed_from_u64(42),
    ));
    magasin.refresh_catalog(test_time()).await.unwrap();
    magasin.refresh_roster(test_time()).await.unwrap();

    Harness {
        magasin,
        equipements,
        techniciens,
        orders,
    }
}

#[tokio::test]
async fn order_flow_commits_reservations_through_the_gateway() {
    let h = setup(vec![test_equipment(1, 10)]).await;
    let id = EquipmentId::new(1);
    let t0 = test_time();

    h.magasin.ajouter_au_panier(id, t0);
    h.magasin.ajouter_au_panier(id, t0);
    assert_eq!(h.magasin.equipement(id).unwrap().nombre, 8);

    let placed = h.magasin.valider_commande(t0).await.unwrap();
    assert!(placed);

    let accepted = h.orders.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].items.len(), 1);
    assert_eq!(accepted[0].items[0].quantity, 2);

    assert!(h.magasin.cart_lines().is_empty());
    assert!(h.magasin.confirmation_pending());

    // The confirmation view resets itself after the fixed delay.
    h.magasin.sweep(t0 + Duration::milliseconds(2900));
    assert!(h.magasin.confirmation_pending());
    h.magasin.sweep(t0 + Duration::milliseconds(3100));
    assert!(!h.magasin.confirmation_pending());
}

#[tokio::test]
async fn failed_order_applies_nothing_and_keeps_reservations() {
    let h = setup(vec![test_equipment(1, 5), test_equipment(2, 5)]).await;
    let t0 = test_time();

    h.magasin.ajouter_au_panier(EquipmentId::new(1), t0);
    h.magasin.ajouter_au_panier(EquipmentId::new(2), t0);
    h.orders.set_fail_orders(true);

    let err = h.magasin.valider_commande(t0).await.unwrap_err();
    assert!(matches!(err, DomainError::Upstream(_)));

    // All-or-nothing: the upstream applied nothing, the cart and its
    // reservations are exactly as before the call.
    assert!(h.orders.accepted().is_empty());
    assert_eq!(h.magasin.cart_lines().len(), 2);
    assert_eq!(h.magasin.equipement(EquipmentId::new(1)).unwrap().nombre, 4);
    assert_eq!(h.magasin.equipement(EquipmentId::new(2)).unwrap().nombre, 4);
    assert!(h
        .magasin
        .notifications()
        .iter()
        .any(|n| n.message == "Erreur lors de la validation du panier."));
}

#[tokio::test]
async fn empty_cart_order_is_a_no_op() {
    let h = setup(vec![test_equipment(1, 5)]).await;

    let placed = h.magasin.valider_commande(test_time()).await.unwrap();
    assert!(!placed);
    assert!(h.orders.accepted().is_empty());
}

#[tokio::test]
async fn approved_request_lives_exactly_three_more_seconds() {
    let h = setup(vec![test_equipment(1, 5), test_equipment(2, 3)]).await;
    let t0 = test_time();

    let request_id = h.magasin.generer_demande(t0).unwrap();
    assert!(h.magasin.approuver_demande(request_id, t0));
    assert_eq!(
        h.magasin.demandes()[0].statut,
        RequestStatus::Approved
    );

    // Second approval is a no-op.
    assert!(!h.magasin.approuver_demande(request_id, t0));

    h.magasin.sweep(t0 + Duration::milliseconds(2900));
    assert_eq!(h.magasin.demandes().len(), 1);

    h.magasin.sweep(t0 + Duration::milliseconds(3100));
    assert!(h.magasin.demandes().is_empty());
}

#[tokio::test]
async fn assignment_is_cleared_only_after_upstream_delete_succeeds() {
    let h = setup(vec![test_equipment(1, 5), test_equipment(2, 3)]).await;
    let tech = TechnicianId::new(1);
    let t0 = test_time();

    assert!(h.magasin.valider_selection(tech, t0));
    let assigned = h.magasin.affectation(tech).unwrap();
    assert!((1..=3).contains(&assigned.len()));

    // Curating twice is a no-op while an assignment exists.
    assert!(!h.magasin.valider_selection(tech, t0));

    h.magasin.valider_affectation(tech, t0).await.unwrap();
    assert!(h.magasin.affectation(tech).is_none());
    assert_eq!(h.techniciens.deleted(), vec![tech]);
    assert!(h
        .magasin
        .notifications()
        .iter()
        .any(|n| n.message == "Demande validée et supprimée pour Selma Trabelsi"));
}

#[tokio::test]
async fn failed_upstream_delete_keeps_local_assignment() {
    let h = setup(vec![test_equipment(1, 5)]).await;
    let tech = TechnicianId::new(1);
    let t0 = test_time();

    assert!(h.magasin.valider_selection(tech, t0));
    h.techniciens.set_fail_deletes(true);

    let err = h.magasin.refuser_affectation(tech, t0).await.unwrap_err();
    assert!(matches!(err, DomainError::Upstream(_)));

    assert!(h.magasin.affectation(tech).is_some());
    assert!(h.techniciens.deleted().is_empty());
    assert!(h
        .magasin
        .notifications()
        .iter()
        .any(|n| n.message.starts_with("Erreur lors de la suppression:")));
}

#[tokio::test]
async fn catalog_refresh_failure_preserves_prior_state() {
    let h = setup(vec![test_equipment(1, 5)]).await;
    let t0 = test_time();

    h.equipements.set_fail_calls(true);
    let err = h.magasin.refresh_catalog(t0).await.unwrap_err();
    assert!(matches!(err, DomainError::Upstream(_)));

    // The previously loaded catalog survives the failed refresh.
    assert_eq!(h.magasin.catalogue().len(), 1);
    assert!(h
        .magasin
        .notifications()
        .iter()
        .any(|n| n.message == "Erreur lors du chargement des équipements"));
}

#[tokio::test]
async fn create_equipement_maps_errors_to_notifications() {
    let h = setup(vec![]).await;
    let t0 = test_time();

    let blank = magasin_stock::EquipmentDraft::default();
    let err = h.magasin.create_equipement(blank, t0).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert!(h
        .magasin
        .notifications()
        .iter()
        .any(|n| n.message == "Champs requis manquants."));

    let created = h
        .magasin
        .create_equipement(
            EquipmentDraft {
                code_imo: "IMO-9".to_string(),
                nom_testeur: "B. Haddad".to_string(),
                nom_equipement: "Pince ampèremétrique".to_string(),
                designation: "Pince AC/DC".to_string(),
                categorie: "Mesure".to_string(),
                nombre: 4,
                ..EquipmentDraft::default()
            },
            t0,
        )
        .await
        .unwrap();

    // The new record is visible in the ledger immediately.
    assert_eq!(h.magasin.equipement(created.id).unwrap().nombre, 4);
    assert!(h
        .magasin
        .notifications()
        .iter()
        .any(|n| n.message == "Équipement ajouté avec succès"));
}

#[tokio::test]
async fn notes_require_content() {
    let h = setup(vec![]).await;

    let err = h
        .magasin
        .create_note("   ", test_time())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::validation("Le contenu est requis."));

    h.magasin
        .create_note("Vérifier le stock des sondes", test_time())
        .await
        .unwrap();
    let notes = h.magasin.list_notes().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "Vérifier le stock des sondes");
}

#[tokio::test]
async fn generator_ticks_follow_the_draw_probability() {
    let h = setup(vec![test_equipment(1, 5)]).await;
    let t0 = test_time();

    let generated = (0..100)
        .filter(|_| h.magasin.tick_generation(t0).is_some())
        .count();

    // 30% draw: loose bounds to stay seed-robust.
    assert!(generated > 10, "generated {generated} requests");
    assert!(generated < 60, "generated {generated} requests");

    assert_eq!(h.magasin.demandes().len(), generated);
}

#[tokio::test]
async fn derived_state_mutators_append_history() {
    let h = setup(vec![test_equipment(1, 5)]).await;
    let id = EquipmentId::new(1);
    let t0 = test_time();

    assert!(h.magasin.toggle_favorite(id));
    assert_eq!(h.magasin.favoris(), vec![id]);

    h.magasin.planifier_maintenance(id, t0 + Duration::days(7), t0);
    h.magasin.ajouter_maintenance(
        id,
        MaintenanceKind::Preventive,
        "Recalibrage annuel",
        "Selma Trabelsi",
        t0,
    );
    h.magasin.noter_equipement(id, 5, "Fiable", "Karim", t0);

    let notifications = h.magasin.notifications();
    assert!(notifications
        .iter()
        .any(|n| n.message.starts_with("Maintenance planifiée pour Alimentation 1 le ")));
    assert!(notifications
        .iter()
        .any(|n| n.message == "Maintenance preventive added for equipment #1"));
    assert!(notifications
        .iter()
        .any(|n| n.message == "Rating added successfully"));
}
