use std::sync::OnceLock;

use super::Hospital;

#[allow(clippy::too_many_arguments)]
fn hospital(
    id: u32,
    name: &str,
    location: &str,
    rating: f64,
    distance: &str,
    specialties: &[&str],
    wait_time: &str,
    price: &str,
    image: &str,
    is_preferred: bool,
    total_doctors: u32,
    emergency_available: bool,
    phone: &str,
    address: &str,
    established: u32,
    beds: u32,
) -> Hospital {
    Hospital {
        id,
        name: name.to_string(),
        location: location.to_string(),
        rating,
        distance: distance.to_string(),
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        wait_time: wait_time.to_string(),
        price: price.to_string(),
        image: image.to_string(),
        is_preferred,
        total_doctors,
        emergency_available,
        phone: phone.to_string(),
        address: address.to_string(),
        established,
        beds,
        status: "open".to_string(),
    }
}

/// The seeded catalog
pub fn all() -> &'static [Hospital] {
    static CATALOG: OnceLock<Vec<Hospital>> = OnceLock::new();

    CATALOG.get_or_init(|| {
        vec![
            hospital(
                1,
                "Central Hospital Yaoundé",
                "Centre, Yaoundé",
                4.8,
                "2.3 km",
                &["Cardiology", "Neurology", "Emergency", "Surgery"],
                "15 mins",
                "₦₦₦",
                "https://images.unsplash.com/photo-1586773860418-d37222d8fce3?w=400&h=200&fit=crop",
                true,
                45,
                true,
                "+237-222-123-456",
                "Avenue Kennedy, Centre, Yaoundé",
                1965,
                200,
            ),
            hospital(
                2,
                "Douala General Hospital",
                "Littoral, Douala",
                4.6,
                "15.7 km",
                &["Surgery", "Pediatrics", "Oncology", "Orthopedics"],
                "25 mins",
                "₦₦",
                "https://images.unsplash.com/photo-1519494026892-80bbd2d6fd0d?w=400&h=200&fit=crop",
                false,
                38,
                true,
                "+237-233-789-012",
                "Boulevard de la Liberté, Douala",
                1972,
                180,
            ),
            hospital(
                3,
                "University Teaching Hospital",
                "Centre, Yaoundé",
                4.7,
                "5.1 km",
                &["Internal Medicine", "Dermatology", "Research", "Teaching"],
                "30 mins",
                "₦₦₦₦",
                "https://images.unsplash.com/photo-1551601651-2a8555f1a136?w=400&h=200&fit=crop",
                false,
                52,
                false,
                "+237-222-345-678",
                "University Campus, Yaoundé",
                1980,
                150,
            ),
            hospital(
                4,
                "Bamenda Regional Hospital",
                "North-West, Bamenda",
                4.9,
                "1.2 km",
                &["Maternity", "General Practice", "Emergency", "Pediatrics"],
                "10 mins",
                "₦₦",
                "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=400&h=200&fit=crop",
                true,
                35,
                true,
                "+237-233-456-789",
                "Hospital Street, Bamenda",
                1978,
                120,
            ),
            hospital(
                5,
                "Presbyterian Hospital Cameroon",
                "North-West, Bamenda",
                4.5,
                "3.8 km",
                &["General Medicine", "Surgery", "Maternity", "Pharmacy"],
                "20 mins",
                "₦₦₦",
                "https://images.unsplash.com/photo-1576091160399-112ba8d25d1f?w=400&h=200&fit=crop",
                false,
                28,
                true,
                "+237-233-567-890",
                "Mile 4, Bamenda",
                1985,
                100,
            ),
            hospital(
                6,
                "St. Elizabeth General Hospital",
                "South-West, Buea",
                4.4,
                "45.2 km",
                &["Emergency", "Surgery", "Internal Medicine", "Radiology"],
                "35 mins",
                "₦₦₦",
                "https://images.unsplash.com/photo-1538108149393-fbbd81895907?w=400&h=200&fit=crop",
                false,
                32,
                true,
                "+237-233-678-901",
                "Molyko Road, Buea",
                1990,
                85,
            ),
            hospital(
                7,
                "Yaounde Gyneco-Obstetric Hospital",
                "Centre, Yaoundé",
                4.3,
                "8.5 km",
                &["Gynecology", "Obstetrics", "Neonatology", "Family Planning"],
                "40 mins",
                "₦₦₦₦",
                "https://images.unsplash.com/photo-1579684453423-f84349ef60b0?w=400&h=200&fit=crop",
                false,
                25,
                true,
                "+237-222-789-012",
                "Essos Quarter, Yaoundé",
                1995,
                75,
            ),
            hospital(
                8,
                "Bafoussam Regional Hospital",
                "West, Bafoussam",
                4.2,
                "85.3 km",
                &["General Practice", "Surgery", "Pediatrics", "Pharmacy"],
                "25 mins",
                "₦₦",
                "https://images.unsplash.com/photo-1586773860418-d37222d8fce3?w=400&h=200&fit=crop",
                false,
                30,
                true,
                "+237-233-890-123",
                "Commercial Avenue, Bafoussam",
                1982,
                110,
            ),
            hospital(
                9,
                "Limbe Regional Hospital",
                "South-West, Limbe",
                4.6,
                "52.1 km",
                &["Emergency", "General Practice", "Surgery", "Maternity"],
                "18 mins",
                "₦₦",
                "https://images.unsplash.com/photo-1576091160550-2173dba999ef?w=400&h=200&fit=crop",
                false,
                26,
                true,
                "+237-233-234-567",
                "Down Beach Road, Limbe",
                1988,
                95,
            ),
            hospital(
                10,
                "Bertoua Regional Hospital",
                "East, Bertoua",
                4.1,
                "125.3 km",
                &["General Practice", "Emergency", "Pediatrics"],
                "30 mins",
                "₦₦",
                "https://images.unsplash.com/photo-1532938911079-1b06ac7ceec7?w=400&h=200&fit=crop",
                false,
                22,
                true,
                "+237-222-456-789",
                "Central Market Area, Bertoua",
                1992,
                80,
            ),
        ]
    })
}

/// Looks a hospital up by id.
pub fn find(id: u32) -> Option<&'static Hospital> {
    all().iter().find(|hospital| hospital.id == id)
}
