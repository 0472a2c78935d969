#![allow(dead_code)]

use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use shop_backend::config::{AdminSeed, Config};
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-secret";
pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const ADMIN_PASSWORD: &str = "Muzion15";

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: SECRET.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        db_max_connections: 1,
        token_ttl_seconds: 7200,
        admin: Some(AdminSeed {
            email: ADMIN_EMAIL.to_string(),
            username: "admin".to_string(),
            password: ADMIN_PASSWORD.to_string(),
        }),
    }
}

/// Starts a fresh app with its own in-memory store on a random port.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let app = shop_backend::build_app(&config)
        .await
        .expect("Failed to build app");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Failed to read local address")
    );

    tokio::spawn(shop_backend::serve_on(
        listener,
        app,
        std::future::pending::<()>(),
    ));

    TestApp {
        address,
        client: Client::new(),
    }
}

pub fn auth_headers(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to create Authorization header"),
    );
    headers
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users/register"))
            .json(&json!({
                "email": email,
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send register request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users/login"))
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send login request")
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse login response JSON");
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_string()
    }

    /// Registers a regular user and returns a token for them.
    pub async fn user_token(&self, username: &str) -> String {
        let email = format!("{username}@shop.test");
        let response = self.register(&email, username, "Secret15").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        self.token_for(&email, "Secret15").await
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Creates a product as admin and returns the response body.
    pub async fn create_product(&self, admin: &str, payload: Value) -> Value {
        let response = self
            .client
            .post(self.url("/products"))
            .headers(auth_headers(admin))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send create product request");
        assert_eq!(response.status(), StatusCode::CREATED);

        response
            .json::<Value>()
            .await
            .expect("Failed to parse product response JSON")
    }

    pub async fn add_to_cart(&self, token: &str, product_id: i64, quantity: i64) {
        let response = self
            .client
            .post(self.url("/carts/add"))
            .headers(auth_headers(token))
            .json(&json!({
                "product_id": product_id,
                "quantity": quantity
            }))
            .send()
            .await
            .expect("Failed to send add to cart request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    pub async fn get_json(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .headers(auth_headers(token))
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON");
        (status, body)
    }

    pub async fn checkout(&self, token: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/orders/create"))
            .headers(auth_headers(token))
            .send()
            .await
            .expect("Failed to send create order request");
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse order response JSON");
        (status, body)
    }
}
