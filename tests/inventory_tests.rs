mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{TestApp, body_text, location, spawn_app};
use inventario::models::{
    DispositivoDraft, EnteDraft, ImpiegatoDraft, OrdineDraft, ReteDraft, ServizioDraft,
};

struct Fixture {
    ente: i32,
    servizio: i32,
    anna: i32,
    bruno: i32,
    rete: i32,
}

async fn seed(app: &TestApp) -> Fixture {
    let store = app.store();
    let ente = store
        .enti()
        .create(&EnteDraft {
            name: "Comune di Prova".to_string(),
            short_name: "CDP".to_string(),
        })
        .await
        .unwrap();
    let servizio = store
        .servizi()
        .create(&ServizioDraft {
            ente_id: ente.id,
            name: "Anagrafe".to_string(),
            location: Some("Piano terra".to_string()),
        })
        .await
        .unwrap();
    let anna = store
        .impiegati()
        .create(&ImpiegatoDraft {
            servizio_id: servizio.id,
            name: "Anna Rossi".to_string(),
            username: Some("arossi".to_string()),
            password: None,
        })
        .await
        .unwrap();
    let bruno = store
        .impiegati()
        .create(&ImpiegatoDraft {
            servizio_id: servizio.id,
            name: "Bruno Verdi".to_string(),
            username: None,
            password: None,
        })
        .await
        .unwrap();
    let rete = store
        .reti()
        .create(&ReteDraft {
            name: "Uffici".to_string(),
            address: "192.168.10.0".to_string(),
            subnet: 24,
            primary_dns: Some("192.168.10.1".to_string()),
            secondary_dns: None,
        })
        .await
        .unwrap();

    Fixture {
        ente: ente.id,
        servizio: servizio.id,
        anna: anna.id,
        bruno: bruno.id,
        rete: rete.id,
    }
}

fn pc(rete_id: i32, impiegati: Vec<i32>) -> DispositivoDraft {
    DispositivoDraft {
        device_type: "PC".to_string(),
        brand: Some("Lenovo".to_string()),
        model: Some("M70q".to_string()),
        inv_ced: Some(1001),
        inv_ente: None,
        serial: Some("SN-1".to_string()),
        ip: Some("192.168.10.20".to_string()),
        hostname: Some("anagrafe-01".to_string()),
        os: Some("Windows 11".to_string()),
        rete_id,
        ordine_id: None,
        impiegati,
    }
}

#[tokio::test]
async fn test_bootstrap_creates_fallback_network() {
    let app = spawn_app().await;

    let reti = app.store().reti().list().await.unwrap();
    assert_eq!(reti.len(), 1);
    assert!(reti[0].sentinel);
    assert_eq!(reti[0].rete.address, "0.0.0.0");
}

#[tokio::test]
async fn test_ente_crud_over_http() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post("/ente_add", "name=Provincia&short_name=PRV", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/ente_list");

    let response = app.get("/ente_list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Provincia"));

    let response = app.post("/ente_add", "name=&short_name=X", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let id = app.store().enti().list().await.unwrap()[0].id;
    let response = app
        .post(
            &format!("/ente_show/{id}"),
            "name=Provincia+di+Prova&short_name=PRV",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let ente = app.store().enti().get(id).await.unwrap().unwrap();
    assert_eq!(ente.name, "Provincia di Prova");
}

#[tokio::test]
async fn test_ente_delete_cascades() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let device = app
        .store()
        .dispositivi()
        .create(&pc(f.rete, vec![f.anna, f.bruno]))
        .await
        .unwrap();

    let response = app.get(&format!("/ente_del/{}", f.ente), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let store = app.store();
    assert!(store.enti().get(f.ente).await.unwrap().is_none());
    assert!(store.servizi().get(f.servizio).await.unwrap().is_none());
    assert!(store.impiegati().get(f.anna).await.unwrap().is_none());
    assert!(store.dispositivi().grants(device.id).await.unwrap().is_empty());
    // Devices outlive the people who used them.
    assert!(store.dispositivi().get(device.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_servizio_needs_existing_ente() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post("/serv_add", "name=Tributi&ente_id=42", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Ente 42 does not exist"));
}

#[tokio::test]
async fn test_editing_missing_record_is_404_before_reference_checks() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post("/serv_show/999", "name=Tributi&ente_id=999", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post("/imp_show/999", "name=Carla&servizio_id=999", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filtered_lists() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;

    let response = app.get(&format!("/serv_list/{}", f.ente), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Anagrafe"));

    let response = app
        .get(&format!("/imp_list/{}", f.servizio), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Anna Rossi"));
    assert!(body.contains("Bruno Verdi"));

    for uri in ["/serv_list/999", "/imp_list/999", "/disp_list/999"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_device_form_replaces_grants() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;

    let body = format!(
        "device_type=PC&rete_id={}&hostname=anagrafe-02&impiegati={}&impiegati={}",
        f.rete, f.anna, f.bruno
    );
    let response = app.post("/disp_add", &body, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let repo = app.store().dispositivi();
    let device = repo.list(None).await.unwrap().remove(0).device;
    let mut expected = vec![f.anna, f.bruno];
    expected.sort_unstable();
    assert_eq!(repo.grants(device.id).await.unwrap(), expected);

    let body = format!(
        "device_type=PC&rete_id={}&hostname=anagrafe-02&impiegati={}",
        f.rete, f.bruno
    );
    let response = app
        .post(&format!("/disp_show/{}", device.id), &body, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(repo.grants(device.id).await.unwrap(), vec![f.bruno]);

    let body = format!("device_type=PC&rete_id={}&hostname=anagrafe-02", f.rete);
    app.post(&format!("/disp_show/{}", device.id), &body, Some(&cookie))
        .await;
    assert!(repo.grants(device.id).await.unwrap().is_empty());

    let response = app.get("/disp_list", Some(&cookie)).await;
    assert!(body_text(response).await.contains("nessuno"));
}

#[tokio::test]
async fn test_device_form_accepts_numbered_grant_fields() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;

    let body = format!(
        "device_type=Stampante&rete_id={}&utente0={}&utente1={}",
        f.rete, f.anna, f.bruno
    );
    let response = app.post("/disp_add", &body, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let repo = app.store().dispositivi();
    let device = repo.list(None).await.unwrap().remove(0).device;
    assert_eq!(repo.grants(device.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_device_rejects_unknown_grantee() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;

    let body = format!("device_type=PC&rete_id={}&impiegati=9999", f.rete);
    let response = app.post("/disp_add", &body, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store().dispositivi().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_inventory_tag_leaves_device_unchanged() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let repo = app.store().dispositivi();
    let device = repo.create(&pc(f.rete, vec![f.anna])).await.unwrap();

    let body = format!(
        "device_type=Portatile&rete_id={}&inv_ced=abc&impiegati={}",
        f.rete, f.bruno
    );
    let response = app
        .post(&format!("/disp_show/{}", device.id), &body, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Modifica dispositivo"));
    assert!(body.contains("value=\"Portatile\""));

    let unchanged = repo.get(device.id).await.unwrap().unwrap();
    assert_eq!(unchanged, device);
    assert_eq!(repo.grants(device.id).await.unwrap(), vec![f.anna]);
}

#[tokio::test]
async fn test_duplicate_hostname_is_a_field_error() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    app.store()
        .dispositivi()
        .create(&pc(f.rete, vec![]))
        .await
        .unwrap();

    let body = format!("device_type=PC&rete_id={}&hostname=anagrafe-01", f.rete);
    let response = app.post("/disp_add", &body, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("hostname is already in use"));
}

#[tokio::test]
async fn test_clone_form_prefills_from_source() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let device = app
        .store()
        .dispositivi()
        .create(&pc(f.rete, vec![f.anna]))
        .await
        .unwrap();

    let response = app
        .get(&format!("/disp_clone/{}", device.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("value=\"Lenovo\""));
    // Auto-escaping renders `/` as `&#x2f;`.
    assert!(body.contains("action=\"&#x2f;disp_add\""));
    assert!(body.contains("Nuovo dispositivo"));
    assert!(!body.contains("anagrafe-01"));
}

#[tokio::test]
async fn test_rete_delete_moves_devices_to_fallback() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let device = app
        .store()
        .dispositivi()
        .create(&pc(f.rete, vec![]))
        .await
        .unwrap();

    let response = app.get(&format!("/net_del/{}", f.rete), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let sentinel = app.store().reti().sentinel().await.unwrap().unwrap();
    let moved = app
        .store()
        .dispositivi()
        .get(device.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.rete_id, sentinel.id);

    let response = app
        .get(&format!("/net_del/{}", sentinel.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(app.store().reti().get(sentinel.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_fallback_network_survives_while_others_exist() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let sentinel = app.store().reti().sentinel().await.unwrap().unwrap();

    let response = app
        .get(&format!("/net_del/{}", sentinel.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(app.store().reti().get(sentinel.id).await.unwrap().is_some());
    assert!(app.store().reti().get(f.rete).await.unwrap().is_some());

    // Renaming is allowed, moving the address is not.
    let response = app
        .post(
            &format!("/net_show/{}", sentinel.id),
            "name=Ignota&address=10.9.9.0&subnet=0",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = app
        .post(
            &format!("/net_show/{}", sentinel.id),
            "name=Ignota&address=0.0.0.0&subnet=0",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let sentinel = app.store().reti().get(sentinel.id).await.unwrap().unwrap();
    assert_eq!(sentinel.name, "Ignota");
    assert_eq!(sentinel.address, "0.0.0.0");
}

#[tokio::test]
async fn test_rete_address_validation() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post(
            "/net_add",
            "name=Server&address=10.0.0.300&subnet=24",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/net_add", "name=Server&address=10.0.0.0&subnet=33", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/net_add", "name=Server&address=10.0.0.0&subnet=16", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.get("/net_list", Some(&cookie)).await;
    let body = body_text(response).await;
    assert!(body.contains("10.0.0.0&#x2f;16"));
    assert!(body.contains("255.255.0.0"));
}

#[tokio::test]
async fn test_ordine_delete_unlinks_devices() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let ordine = app
        .store()
        .ordini()
        .create(&OrdineDraft {
            order_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            order_number: "2024/17".to_string(),
            warranty_expiry: NaiveDate::from_ymd_opt(2027, 3, 1),
            supplier: Some("Ditta Srl".to_string()),
        })
        .await
        .unwrap();
    let device = app
        .store()
        .dispositivi()
        .create(&DispositivoDraft {
            ordine_id: Some(ordine.id),
            ..pc(f.rete, vec![])
        })
        .await
        .unwrap();

    let response = app
        .get(&format!("/order_details/{}", ordine.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("anagrafe-01"));

    let response = app
        .get(&format!("/order_del/{}", ordine.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let device = app
        .store()
        .dispositivi()
        .get(device.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(device.ordine_id, None);
    assert!(app.store().ordini().get(ordine.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_ordine_form_rejects_bad_date() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post(
            "/order_add",
            "order_number=1&order_date=01/03/2024",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/order_add",
            "order_number=1&order_date=2024-03-01&warranty_expiry=",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_details_pages() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    let device = app
        .store()
        .dispositivi()
        .create(&pc(f.rete, vec![f.anna]))
        .await
        .unwrap();

    let response = app
        .get(&format!("/disp_details/{}", device.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Anna Rossi"));

    let response = app
        .get(&format!("/imp_details/{}", f.anna), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("anagrafe-01"));

    let response = app
        .get(&format!("/net_details/{}", f.rete), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("anagrafe-01"));
}

#[tokio::test]
async fn test_dashboard_counts() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    app.store()
        .dispositivi()
        .create(&pc(f.rete, vec![]))
        .await
        .unwrap();

    let stats = app.store().stats().dashboard().await.unwrap();
    assert_eq!(stats.totals.enti, 1);
    assert_eq!(stats.totals.impiegati, 2);
    assert_eq!(stats.totals.reti, 2);
    assert_eq!(stats.enti[0].servizi, 1);
    assert_eq!(stats.enti[0].impiegati, 2);

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Comune di Prova"));
}

#[tokio::test]
async fn test_reports() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let f = seed(&app).await;
    app.store()
        .dispositivi()
        .create(&pc(f.rete, vec![]))
        .await
        .unwrap();

    let result = app
        .store()
        .reports()
        .run("employees_of_ente", Some("CDP"))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0][0].as_deref(), Some("Anna Rossi"));

    let result = app
        .store()
        .reports()
        .run("devices_without_grants", None)
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);

    let response = app
        .post("/query", "report=devices_by_type&param=PC", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Lenovo"));

    let response = app
        .post("/query", "report=employees_of_ente&param=", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/query", "report=drop_everything", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
