use once_cell::sync::Lazy;

use crate::challenge_pool::ChallengeEntry;
use crate::wheel_sectors::ColorSector;

const RED_CATEGORY: &str = "Pocałunek/Zbliżenie";
const BLUE_CATEGORY: &str = "Przytulenie/Gest";
const GREEN_CATEGORY: &str = "Komplement/Śmieszna akcja";
const YELLOW_CATEGORY: &str = "Taniec/Akcja absurdalna";

const RED_CHALLENGES: [&str; 20] = [
    "Pocałuj osobę po lewej",
    "Pocałuj osobę po prawej",
    "Pocałuj osobę na wprost",
    "Zbliżenie z kimkolwiek w zasięgu ręki",
    "Pocałuj na policzek",
    "Pocałuj na czubek nosa",
    "Przyciągnij osobę do siebie i pocałuj",
    "Pocałuj w ramię",
    "Pocałuj w dłoń",
    "Pocałuj w czoło",
    "Pocałuj w policzek 2 osoby",
    "Pocałuj najbliższą osobę",
    "Pocałuj kogoś siedzącego obok",
    "Pocałuj w ucho (głupkowato)",
    "Pocałuj w rękę z gestem królewskim",
    "Pocałuj i zrób 'air kiss' w stronę kogoś",
    "Pocałuj osobę, która najbardziej krzyczy",
    "Pocałuj w nos 2 osoby po kolei",
    "Pocałuj osobę, która ma najśmieszniejszą minę",
    "Pocałuj osobę w losowy sposób",
];

const BLUE_CHALLENGES: [&str; 20] = [
    "Przytul osobę po lewej",
    "Przytul osobę po prawej",
    "Przytul 2 osoby jednocześnie",
    "Przytul najbliższą osobę i udawaj misia",
    "Przytul kogoś stojącego obok",
    "Przytul osobę z największym uśmiechem",
    "Przytul i obróć 360 stopni",
    "Przytul osobę i zrób 'high five'",
    "Przytul i zaśpiewaj 'la la la'",
    "Przytul w łokieć",
    "Przytul w ramię",
    "Przytul i potrząśnij delikatnie",
    "Przytul i udawaj drzewo",
    "Przytul osobę najgłośniej krzyczącą",
    "Przytul osobę w losowy sposób",
    "Przytul osobę, która stoi w środku",
    "Przytul kogoś i zrób mini taniec",
    "Przytul i powiedz komplement",
    "Przytul osobę, która się śmieje najgłośniej",
    "Przytul losową osobę",
];

const GREEN_CHALLENGES: [&str; 20] = [
    "Powiedz komuś komplement",
    "Powiedz coś absurdalnego o sobie",
    "Udawaj kogoś przez 10 sek",
    "Powiedz najgłupszy żart jaki znasz",
    "Udawaj zwierzę",
    "Powiedz sekret, który każdy powinien znać",
    "Udawaj upadek w zabawny sposób",
    "Powiedz coś w języku wymyślonym przez siebie",
    "Powiedz coś komplementującego wszystkich wokół",
    "Udawaj, że jesteś DJ-em",
    "Powiedz coś śmiesznego i energicznie",
    "Zrób minę strasznie głupią",
    "Powiedz kogo najbardziej lubisz w pokoju",
    "Udawaj, że pijesz niewidzialny shot",
    "Powiedz 'kocham imprezę!' z gestem",
    "Udawaj piosenkę i śpiewaj 5 sekund",
    "Powiedz coś, co każdy powinien powtórzyć",
    "Zrób głupią pozę",
    "Powiedz coś absurdalnego do losowej osoby",
    "Udawaj, że jesteś influencerem",
];

const YELLOW_CHALLENGES: [&str; 20] = [
    "Zrób mini taniec",
    "Zrób taniec w miejscu",
    "Zrób taniec na stole lub krześle",
    "Zrób 'air dance' przez 10 sek",
    "Obróć się 3 razy i zatańcz",
    "Zrób absurdalny taniec z rękami",
    "Zatańcz z losową osobą",
    "Udawaj robota i tańcz",
    "Zrób taniec misia",
    "Zrób taniec zombie",
    "Zrób taniec kangura",
    "Zrób taniec na jednej nodze",
    "Zrób taniec „podłoga w ogień”",
    "Zrób taniec w parach",
    "Zrób absurdalny taniec solo",
    "Tańcz z wyciągniętymi rękami",
    "Zrób taniec i krzycz 'woo!'",
    "Zrób taniec po kole",
    "Zrób taniec jak w teledysku",
    "Zrób taniec naśladujący losową osobę",
];

/// The stock 80-card deck, ids 1..=80 in red, blue, green, yellow order.
pub static BUILTIN_DECK: Lazy<Vec<ChallengeEntry>> = Lazy::new(|| {
    let groups: [(ColorSector, &str, &[&str]); 4] = [
        (ColorSector::Red, RED_CATEGORY, &RED_CHALLENGES),
        (ColorSector::Blue, BLUE_CATEGORY, &BLUE_CHALLENGES),
        (ColorSector::Green, GREEN_CATEGORY, &GREEN_CHALLENGES),
        (ColorSector::Yellow, YELLOW_CATEGORY, &YELLOW_CHALLENGES),
    ];

    let mut deck = Vec::with_capacity(80);
    let mut id = 1;
    for (color, category, texts) in groups {
        for text in texts {
            deck.push(ChallengeEntry::new(id, color, category, *text));
            id += 1;
        }
    }
    deck
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_deck_shape() {
        assert_eq!(BUILTIN_DECK.len(), 80);
        assert_eq!(BUILTIN_DECK[0].id, 1);
        assert_eq!(BUILTIN_DECK[79].id, 80);
        for color in ColorSector::ALL {
            let count = BUILTIN_DECK.iter().filter(|e| e.color == color).count();
            assert_eq!(count, 20);
        }
        assert_eq!(BUILTIN_DECK[40].color, ColorSector::Green);
        assert_eq!(BUILTIN_DECK[40].category, GREEN_CATEGORY);
    }
}
