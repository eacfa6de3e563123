#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    six_cities::rocket()
}
