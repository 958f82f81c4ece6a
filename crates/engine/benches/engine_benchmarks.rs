use chrono::{DateTime, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use magasin_cart::Cart;
use magasin_core::EquipmentId;
use magasin_insights::generate_alerts;
use magasin_notify::NotificationBus;
use magasin_stock::{Equipment, EquipmentDraft, StockLedger};

fn bench_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap()
}

fn bench_equipment(id: i64, nombre: u32) -> Equipment {
    EquipmentDraft {
        code_imo: format!("IMO-{id}"),
        nom_testeur: "B. Haddad".to_string(),
        nom_equipement: format!("Equipement {id}"),
        designation: "Banc de test".to_string(),
        categorie: "Mesure".to_string(),
        nombre,
        ..EquipmentDraft::default()
    }
    .build(EquipmentId::new(id))
    .unwrap()
}

fn bench_ledger_adjustments(c: &mut Criterion) {
    c.bench_function("ledger_adjust_quantity", |b| {
        let mut ledger = StockLedger::new();
        ledger.insert(bench_equipment(1, 1_000_000));
        let id = EquipmentId::new(1);

        b.iter(|| {
            ledger.adjust_quantity(black_box(id), -1).unwrap();
            ledger.adjust_quantity(black_box(id), 1).unwrap();
        });
    });
}

fn bench_cart_reserve_release(c: &mut Criterion) {
    c.bench_function("cart_reserve_release", |b| {
        let mut ledger = StockLedger::new();
        ledger.insert(bench_equipment(1, 1_000_000));
        let id = EquipmentId::new(1);
        let now = bench_time();

        b.iter(|| {
            let mut cart = Cart::new();
            let mut bus = NotificationBus::new();
            cart.add(&mut ledger, &mut bus, id, now).unwrap();
            cart.remove(&mut ledger, &mut bus, id, now).unwrap();
        });
    });
}

fn bench_alert_generation(c: &mut Criterion) {
    let snapshot: Vec<Equipment> = (1..=1_000)
        .map(|id| bench_equipment(id, (id % 12) as u32))
        .collect();
    let now = bench_time();

    c.bench_function("generate_alerts_1k", |b| {
        b.iter(|| generate_alerts(black_box(&snapshot), now));
    });
}

criterion_group!(
    benches,
    bench_ledger_adjustments,
    bench_cart_reserve_release,
    bench_alert_generation
);
criterion_main!(benches);
